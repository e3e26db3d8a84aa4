//! Travel domain - itineraries owned by a user

mod entity;
mod response;

pub use entity::{Travel, TravelDraft, TravelPatch};
pub use response::TravelResponse;

//! User domain - account holders

mod entity;
mod response;

pub use entity::{User, UserDraft, UserPatch};
pub use response::UserResponse;

//! Step domain - legs and stops of a travel

mod entity;
mod response;

pub use entity::{Step, StepDraft, StepPatch};
pub use response::StepResponse;

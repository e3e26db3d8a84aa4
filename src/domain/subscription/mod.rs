//! Subscription domain - billing subscriptions of users

mod entity;
mod response;

pub use entity::{Subscription, SubscriptionDraft, SubscriptionPatch};
pub use response::SubscriptionResponse;

//! Preference domain - per-user settings

mod entity;
mod response;

pub use entity::{
    OtherPreferences, Preference, PreferenceDraft, PreferencePatch, RoutePreferences,
    TransportMode,
};
pub use response::PreferenceResponse;

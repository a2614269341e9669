//! Audio Manager - one "now playing" slot shared by every play control.
//! The controller is plain state; `AudioTourController` wires it to the
//! event bus outside the component render cycle.

mod cache_token;
mod controller;
mod controller_web;
mod engine;
mod identity;
mod precheck;
mod state;
mod tracks;
mod web_engine;

pub use controller::PlaybackController;
pub use controller_web::{AudioTourController, PlaybackSignal};
pub use identity::{ControlKey, ControlVisual};
pub use tracks::TOUR_PLAYLIST;
pub use web_engine::PlatformEngine;

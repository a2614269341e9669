//! The components module contains all shared components for the tour.

mod app;
mod app_view;
pub mod audio_manager;
mod footer;
mod icons;
mod language_switcher;
pub mod map;
mod player;
pub mod transcript;
mod views;

pub use app::*;
pub use app_view::*;
pub use footer::*;
pub use icons::*;
pub use language_switcher::*;
pub use player::*;
// Views are accessed via views::ViewName

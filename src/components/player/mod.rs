use dioxus::logger::tracing::error;

mod controls;

pub use controls::PlayButton;

/// Blocking notice for playback failures the visitor must see.
pub fn show_alert(message: &str) {
    error!("{message}");
    #[cfg(target_arch = "wasm32")]
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

// Optimistic HEAD checks for audio files. Results are only logged; the
// controller is initialized regardless.
use super::tracks::TrackList;
use crate::api::head_exists;
use dioxus::logger::tracing::{debug, warn};
use futures_util::future::join_all;

pub async fn precheck_audio(tracks: &TrackList, host_base: &str) -> Vec<String> {
    let urls = tracks.urls();
    let checks = urls.iter().map(|url| async move {
        match head_exists(url, host_base).await {
            Ok(true) => None,
            Ok(false) => {
                warn!("audio file missing: {url}");
                Some(url.clone())
            }
            Err(err) => {
                debug!("audio precheck skipped for {url}: {err}");
                None
            }
        }
    });
    join_all(checks).await.into_iter().flatten().collect()
}

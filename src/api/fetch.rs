// Static-file fetching. Browser builds go through gloo-net so relative paths
// resolve against the page; host builds resolve against `host_base_url`.
use serde::de::DeserializeOwned;

#[cfg(not(target_arch = "wasm32"))]
use once_cell::sync::Lazy;

#[cfg(not(target_arch = "wasm32"))]
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Joins path segments into a site-relative path, percent-encoding each segment.
pub fn join_path(base: &str, segments: &[&str]) -> String {
    let mut path = base.trim_end_matches('/').to_string();
    for segment in segments {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(&urlencoding::encode(segment));
    }
    path
}

#[cfg(target_arch = "wasm32")]
pub async fn fetch_json<T: DeserializeOwned>(url: &str, _host_base: &str) -> Result<T, FetchError> {
    let response = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|err| FetchError::Network {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

    if !response.ok() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    response.json::<T>().await.map_err(|err| FetchError::Decode {
        url: url.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn fetch_json<T: DeserializeOwned>(url: &str, host_base: &str) -> Result<T, FetchError> {
    let absolute = resolve_host_url(url, host_base)?;
    let response = HTTP_CLIENT
        .get(absolute.clone())
        .send()
        .await
        .map_err(|err| FetchError::Network {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|err| FetchError::Network {
        url: url.to_string(),
        reason: err.to_string(),
    })?;
    serde_json::from_str::<T>(&body).map_err(|err| FetchError::Decode {
        url: url.to_string(),
        reason: err.to_string(),
    })
}

/// HEAD request used for optimistic existence checks.
#[cfg(target_arch = "wasm32")]
pub async fn head_exists(url: &str, _host_base: &str) -> Result<bool, FetchError> {
    let response = gloo_net::http::RequestBuilder::new(url)
        .method(gloo_net::http::Method::HEAD)
        .send()
        .await
        .map_err(|err| FetchError::Network {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
    Ok(response.ok())
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn head_exists(url: &str, host_base: &str) -> Result<bool, FetchError> {
    let absolute = resolve_host_url(url, host_base)?;
    let response = HTTP_CLIENT
        .head(absolute)
        .send()
        .await
        .map_err(|err| FetchError::Network {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
    Ok(response.status().is_success())
}

#[cfg(not(target_arch = "wasm32"))]
fn resolve_host_url(url: &str, host_base: &str) -> Result<reqwest::Url, FetchError> {
    if let Ok(absolute) = reqwest::Url::parse(url) {
        return Ok(absolute);
    }
    let base = reqwest::Url::parse(host_base).map_err(|err| FetchError::InvalidUrl {
        url: host_base.to_string(),
        reason: err.to_string(),
    })?;
    base.join(url.trim_start_matches('/'))
        .map_err(|err| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })
}

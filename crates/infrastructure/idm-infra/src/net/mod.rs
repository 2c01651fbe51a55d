use idm_core::ApiError;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client shared by every backend call.
pub fn default_http_client() -> Result<Client, ApiError> {
    Client::builder()
        .timeout(idm_config::HTTP_REQUEST_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(
            idm_config::HTTP_MAX_REDIRECTS,
        ))
        .user_agent(concat!("idm-console/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(map_reqwest_error)
}

/// Flatten a transport error into the classes the application reasons about.
pub fn map_reqwest_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(e.to_string())
    } else if e.is_connect() {
        ApiError::Connect(e.to_string())
    } else if e.is_redirect() {
        ApiError::Redirect(e.to_string())
    } else if e.is_builder() {
        ApiError::Builder(e.to_string())
    } else if e.is_decode() || e.is_body() {
        ApiError::Decode(e.to_string())
    } else if let Some(status) = e.status() {
        ApiError::status(status.as_u16(), e.to_string())
    } else {
        ApiError::Request(e.to_string())
    }
}

/// Normalize a base URL so it can be joined with relative endpoint paths.
///
/// `Url::join` treats a base without a trailing slash as a file and would
/// drop its last segment.
pub fn normalize_base(base_url: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ApiError::Builder(format!("invalid base url {base_url}: {e}")))?;
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}

/// Append path segments to `base`, percent-encoding each one.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    {
        let mut segs = url
            .path_segments_mut()
            .map_err(|_| ApiError::Builder(format!("cannot use {base} as a base url")))?;
        segs.pop_if_empty();
        for s in segments {
            segs.push(s);
        }
    }
    Ok(url)
}

/// Turn a non-success status into `ApiError::Status`, keeping the body text
/// as the message.
pub async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().clone();
    let body = resp.text().await.unwrap_or_default();
    debug!("{} answered {}: {}", url, status, body);
    let message = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    } else {
        body
    };
    Err(ApiError::status(status.as_u16(), message))
}

pub async fn decode_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let resp = check_status(resp).await?;
    let bytes = resp.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

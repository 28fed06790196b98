//! Shared HTTP plumbing for the analysis service client.

use std::borrow::Cow;
use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::HeaderValue;
use tracing::warn;

use crate::error::PharmaGuardError;

pub(crate) mod pharmaguard;

const ERROR_BODY_MAX_BYTES: usize = 2048;
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

static HTTP_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

pub(crate) fn env_base(default: &'static str, env_var: &str) -> Cow<'static, str> {
    std::env::var(env_var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(Cow::Owned)
        .unwrap_or_else(|| Cow::Borrowed(default))
}

/// Returns the shared HTTP client.
///
/// Plain reqwest with timeouts only: analysis submissions carry streaming
/// multipart bodies that cannot be replayed, responses are per-patient and
/// must not be cached, and failed submissions are terminal for the cycle, so
/// there is no retry or cache layer here.
pub(crate) fn shared_client() -> Result<reqwest::Client, PharmaGuardError> {
    if let Some(client) = HTTP_CLIENT.get() {
        return Ok(client.clone());
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("pharmaguard-cli/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(PharmaGuardError::HttpClientInit)?;

    match HTTP_CLIENT.set(client.clone()) {
        Ok(()) => Ok(client),
        Err(_) => HTTP_CLIENT
            .get()
            .cloned()
            .ok_or_else(|| PharmaGuardError::Service {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                detail: Some("Shared HTTP client initialization race".into()),
            }),
    }
}

pub(crate) fn body_excerpt(bytes: &[u8]) -> String {
    let full = String::from_utf8_lossy(bytes);

    let truncated: &str = if full.len() > ERROR_BODY_MAX_BYTES {
        let mut end = ERROR_BODY_MAX_BYTES;
        while end > 0 && !full.is_char_boundary(end) {
            end -= 1;
        }
        &full[..end]
    } else {
        full.as_ref()
    };

    let mut s = truncated.trim().replace(['\n', '\r', '\t'], " ");
    if full.len() > ERROR_BODY_MAX_BYTES {
        s.push_str(" …");
    }
    s
}

pub(crate) fn ensure_json_content_type(
    content_type: Option<&HeaderValue>,
    body: &[u8],
) -> Result<(), PharmaGuardError> {
    let Some(content_type) = content_type else {
        return Ok(());
    };

    let raw = match content_type.to_str() {
        Ok(v) => v.trim(),
        Err(_) => {
            warn!("Response content-type header was not valid UTF-8; attempting JSON parse");
            return Ok(());
        }
    };
    if raw.is_empty() {
        return Ok(());
    }

    let media_type = raw
        .split(';')
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_ascii_lowercase();
    let is_html = matches!(media_type.as_str(), "text/html" | "application/xhtml+xml");
    if is_html {
        return Err(PharmaGuardError::Service {
            status: reqwest::StatusCode::OK,
            detail: Some(format!(
                "Unexpected HTML response (content-type: {raw}): {}",
                body_excerpt(body)
            )),
        });
    }

    let is_json = media_type == "application/json"
        || media_type == "text/json"
        || media_type.ends_with("+json");
    if !is_json {
        warn!(
            content_type = raw,
            "Unexpected non-JSON content type; attempting JSON parse for compatibility"
        );
    }

    Ok(())
}

pub(crate) async fn read_limited_body(
    mut resp: reqwest::Response,
) -> Result<Vec<u8>, PharmaGuardError> {
    let mut body: Vec<u8> = Vec::new();

    while let Some(chunk) = resp.chunk().await? {
        let next_len = body.len().saturating_add(chunk.len());
        if next_len > DEFAULT_MAX_BODY_BYTES {
            return Err(PharmaGuardError::Service {
                status: reqwest::StatusCode::OK,
                detail: Some(format!("Response body exceeded {DEFAULT_MAX_BODY_BYTES} bytes")),
            });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum PharmaGuardError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis service error (HTTP {status}): {}", detail.as_deref().unwrap_or("no detail provided"))]
    Service {
        status: reqwest::StatusCode,
        detail: Option<String>,
    },

    #[error("analysis service returned malformed JSON: {source}")]
    ServiceJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("analysis service returned an empty result set")]
    EmptyResults,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PharmaGuardError {
    /// The server-provided `detail` string, when the failure carried one.
    pub fn service_detail(&self) -> Option<&str> {
        match self {
            Self::Service { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

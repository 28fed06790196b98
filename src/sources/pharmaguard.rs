use std::borrow::Cow;

use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;

use crate::catalog::DrugSelection;
use crate::error::PharmaGuardError;
use crate::submit::{ProgressSink, UploadFile};

const PHARMAGUARD_BASE: &str = "http://localhost:8000";
const PHARMAGUARD_BASE_ENV: &str = "PHARMAGUARD_API_BASE";

const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Error bodies from the service carry a FastAPI-style `detail` string.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    detail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceHealth {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub supported_drugs: Vec<String>,
    #[serde(default)]
    pub supported_genes: Vec<String>,
    #[serde(default)]
    pub llm_available: bool,
}

/// Client for the PharmaGuard analysis service.
pub struct AnalysisClient {
    client: reqwest::Client,
    base: Cow<'static, str>,
}

impl AnalysisClient {
    pub fn new() -> Result<Self, PharmaGuardError> {
        Ok(Self {
            client: crate::sources::shared_client()?,
            base: crate::sources::env_base(PHARMAGUARD_BASE, PHARMAGUARD_BASE_ENV),
        })
    }

    /// Client pointed at an explicit base URL (tests, `--api-base`).
    pub fn with_base(base: String) -> Result<Self, PharmaGuardError> {
        Ok(Self {
            client: crate::sources::shared_client()?,
            base: Cow::Owned(base),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_ref().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Submits a VCF upload for analysis and returns the raw response body.
    ///
    /// The file part is streamed in chunks so `progress` sees the byte-upload
    /// ratio as it happens. Raw JSON is returned untouched; callers normalize
    /// it and keep the original for export.
    pub async fn analyze(
        &self,
        file: &UploadFile,
        drugs: &DrugSelection,
        patient_id: Option<&str>,
        progress: &ProgressSink,
    ) -> Result<serde_json::Value, PharmaGuardError> {
        let mut form = reqwest::multipart::Form::new()
            .part("file", upload_part(file, progress.clone()))
            .text("drugs", drugs.codes_joined());
        if let Some(patient_id) = patient_id {
            form = form.text("patient_id", patient_id.to_string());
        }

        self.post_multipart("analyze", form).await
    }

    /// Demo analysis against server-synthesized patient data. No file, no
    /// upload progress.
    pub async fn analyze_demo(
        &self,
        drugs: &DrugSelection,
    ) -> Result<serde_json::Value, PharmaGuardError> {
        let form = reqwest::multipart::Form::new().text("drugs", drugs.codes_joined());
        self.post_multipart("analyze/demo", form).await
    }

    pub async fn health(&self) -> Result<ServiceHealth, PharmaGuardError> {
        let resp = self
            .client
            .get(self.endpoint("health"))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        let content_type = resp.headers().get(reqwest::header::CONTENT_TYPE).cloned();
        let bytes = crate::sources::read_limited_body(resp).await?;

        if !status.is_success() {
            return Err(PharmaGuardError::Service {
                status,
                detail: parse_detail(&bytes),
            });
        }

        crate::sources::ensure_json_content_type(content_type.as_ref(), &bytes)?;
        serde_json::from_slice(&bytes).map_err(|source| PharmaGuardError::ServiceJson { source })
    }

    async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<serde_json::Value, PharmaGuardError> {
        let resp = self
            .client
            .post(self.endpoint(path))
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let content_type = resp.headers().get(reqwest::header::CONTENT_TYPE).cloned();
        let bytes = crate::sources::read_limited_body(resp).await?;

        if !status.is_success() {
            return Err(PharmaGuardError::Service {
                status,
                detail: parse_detail(&bytes),
            });
        }

        crate::sources::ensure_json_content_type(content_type.as_ref(), &bytes)?;
        serde_json::from_slice(&bytes).map_err(|source| PharmaGuardError::ServiceJson { source })
    }
}

fn parse_detail(bytes: &[u8]) -> Option<String> {
    serde_json::from_slice::<ServiceErrorBody>(bytes)
        .ok()
        .and_then(|body| body.detail)
        .filter(|detail| !detail.trim().is_empty())
}

/// Builds the streaming `file` part. Each emitted chunk advances the sink by
/// the rescaled byte-upload ratio.
fn upload_part(file: &UploadFile, progress: ProgressSink) -> reqwest::multipart::Part {
    let total = file.size() as u64;
    let chunks: Vec<Bytes> = file
        .content
        .chunks(UPLOAD_CHUNK_BYTES)
        .map(Bytes::copy_from_slice)
        .collect();

    let mut sent = 0u64;
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        progress.observe_upload(sent, total);
        Ok::<Bytes, std::io::Error>(chunk)
    });

    reqwest::multipart::Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
        .file_name(file.name.clone())
}

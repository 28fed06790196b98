//! Report export: the raw server payload, pretty-printed, under a stable
//! filename.

use std::path::{Path, PathBuf};

use time::format_description::FormatItem;
use time::macros::format_description;

use crate::error::PharmaGuardError;

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// `pharmaguard_{patient_id}_{ISO-date}.json`. Payloads without a patient id
/// (bare single-drug responses can omit it) fall back to "unknown".
pub fn report_filename(patient_id: Option<&str>, date: time::Date) -> String {
    let date = date.format(ISO_DATE).unwrap_or_else(|_| date.to_string());
    format!("pharmaguard_{}_{}.json", patient_id.unwrap_or("unknown"), date)
}

/// Default export path in the current directory, dated today (UTC).
pub fn default_report_path(raw: &serde_json::Value) -> PathBuf {
    let patient_id = raw.get("patient_id").and_then(|v| v.as_str());
    PathBuf::from(report_filename(
        patient_id,
        time::OffsetDateTime::now_utc().date(),
    ))
}

/// Writes the exact server payload (pretty-printed) to `path`. The normalized
/// view is never exported.
pub async fn write_report(path: &Path, raw: &serde_json::Value) -> Result<(), PharmaGuardError> {
    let pretty = crate::render::json::to_pretty(raw)?;
    tokio::fs::write(path, pretty).await?;
    Ok(())
}

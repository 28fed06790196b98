//! Typed view of an analysis response and the normalizer that builds it.
//!
//! The service answers single-drug queries with a bare result object and
//! multi-drug queries with a wrapped batch. [`normalize`] is the one place
//! that absorbs that inconsistency; everything downstream sees a [`BatchView`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PharmaGuardError;

/// Categorical outcome of a drug-gene risk assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RiskLabel {
    Safe,
    #[serde(rename = "Adjust Dosage")]
    AdjustDosage,
    Toxic,
    Ineffective,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLabel::Safe => "Safe",
            RiskLabel::AdjustDosage => "Adjust Dosage",
            RiskLabel::Toxic => "Toxic",
            RiskLabel::Ineffective => "Ineffective",
            RiskLabel::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

impl Default for RiskLabel {
    fn default() -> Self {
        RiskLabel::Unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Moderate,
    High,
    Critical,
    #[serde(other)]
    Unspecified,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Unspecified
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Unspecified => "unspecified",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RiskAssessment {
    #[serde(default)]
    pub risk_label: RiskLabel,
    #[serde(default)]
    pub severity: Severity,
    /// Clamped into [0, 1] during normalization.
    #[serde(default)]
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DetectedVariant {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub gene: Option<String>,
    #[serde(default)]
    pub chrom: String,
    #[serde(default)]
    pub pos: String,
    #[serde(default, rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub star_allele: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PharmacogenomicProfile {
    #[serde(default)]
    pub primary_gene: String,
    #[serde(default)]
    pub diplotype: String,
    #[serde(default)]
    pub phenotype: String,
    #[serde(default)]
    pub detected_variants: Vec<DetectedVariant>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClinicalRecommendation {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlmExplanation {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub mechanism: Option<String>,
    #[serde(default)]
    pub clinical_impact: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QualityMetrics {
    #[serde(default)]
    pub vcf_parsing_success: bool,
}

/// One drug's assessment within a report.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DrugResult {
    #[serde(default)]
    pub drug: String,
    #[serde(default)]
    pub risk_assessment: RiskAssessment,
    #[serde(default)]
    pub pharmacogenomic_profile: PharmacogenomicProfile,
    #[serde(default)]
    pub clinical_recommendation: ClinicalRecommendation,
    #[serde(default)]
    pub llm_generated_explanation: Option<LlmExplanation>,
    #[serde(default)]
    pub quality_metrics: QualityMetrics,
}

/// Canonical post-normalization report. `results` is never empty and keeps
/// the order the server returned.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BatchView {
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub overall_risk_summary: Option<String>,
    #[serde(default)]
    pub results: Vec<DrugResult>,
}

/// Maps a raw response body into one canonical [`BatchView`].
///
/// A payload carrying a `results` field is already batch-shaped and is read
/// directly; anything else is treated as a single bare [`DrugResult`] and
/// wrapped, with no batch-level metadata. The input is not mutated.
pub fn normalize(raw: &serde_json::Value) -> Result<BatchView, PharmaGuardError> {
    let mut view = if raw.get("results").is_some() {
        BatchView::deserialize(raw).map_err(|source| PharmaGuardError::ServiceJson { source })?
    } else {
        let result =
            DrugResult::deserialize(raw).map_err(|source| PharmaGuardError::ServiceJson { source })?;
        BatchView {
            patient_id: None,
            timestamp: None,
            overall_risk_summary: None,
            results: vec![result],
        }
    };

    if view.results.is_empty() {
        return Err(PharmaGuardError::EmptyResults);
    }

    for result in &mut view.results {
        let score = &mut result.risk_assessment.confidence_score;
        *score = score.clamp(0.0, 1.0);
    }

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::{BatchView, RiskLabel, Severity, normalize};
    use crate::error::PharmaGuardError;
    use serde_json::json;

    fn bare_result(drug: &str, label: &str) -> serde_json::Value {
        json!({
            "patient_id": "PATIENT_AB12CD34",
            "drug": drug,
            "timestamp": "2026-08-29T10:00:00+00:00",
            "risk_assessment": {
                "risk_label": label,
                "confidence_score": 0.92,
                "severity": "high"
            },
            "pharmacogenomic_profile": {
                "primary_gene": "CYP2D6",
                "diplotype": "*4/*4",
                "phenotype": "Poor Metabolizer",
                "detected_variants": [
                    {"id": "rs3892097", "gene": "CYP2D6", "chrom": "22",
                     "pos": "42526694", "ref": "C", "alt": "T", "star_allele": "*4"}
                ]
            },
            "clinical_recommendation": {
                "action": "Avoid codeine",
                "notes": "Use an alternative analgesic."
            },
            "llm_generated_explanation": {
                "summary": "CYP2D6 poor metabolizer.",
                "mechanism": "No conversion to morphine.",
                "clinical_impact": "Analgesic failure."
            },
            "quality_metrics": {"vcf_parsing_success": true}
        })
    }

    #[test]
    fn bare_payload_becomes_single_result_batch() {
        let raw = bare_result("CODEINE", "Toxic");
        let view = normalize(&raw).unwrap();

        assert_eq!(view.results.len(), 1);
        assert!(view.patient_id.is_none());
        assert!(view.timestamp.is_none());
        assert!(view.overall_risk_summary.is_none());

        let result = &view.results[0];
        assert_eq!(result.drug, "CODEINE");
        assert_eq!(result.risk_assessment.risk_label, RiskLabel::Toxic);
        assert_eq!(result.risk_assessment.severity, Severity::High);
        assert_eq!(
            result.pharmacogenomic_profile.detected_variants[0].reference,
            "C"
        );
        assert_eq!(
            result
                .llm_generated_explanation
                .as_ref()
                .and_then(|e| e.summary.as_deref()),
            Some("CYP2D6 poor metabolizer.")
        );
    }

    #[test]
    fn wrapped_payload_preserves_metadata_and_order() {
        let raw = json!({
            "patient_id": "PATIENT_AB12CD34",
            "timestamp": "2026-08-29T10:00:00+00:00",
            "overall_risk_summary": "HIGH RISK: Critical drug-gene interactions detected.",
            "results": [bare_result("CODEINE", "Toxic"), bare_result("WARFARIN", "Safe")]
        });

        let view = normalize(&raw).unwrap();
        assert_eq!(view.patient_id.as_deref(), Some("PATIENT_AB12CD34"));
        assert!(view.overall_risk_summary.is_some());
        assert_eq!(view.results.len(), 2);
        assert_eq!(view.results[0].drug, "CODEINE");
        assert_eq!(view.results[1].drug, "WARFARIN");
        assert_eq!(view.results[1].risk_assessment.risk_label, RiskLabel::Safe);
    }

    #[test]
    fn normalize_does_not_mutate_input() {
        let raw = bare_result("CODEINE", "Toxic");
        let before = raw.clone();
        let _ = normalize(&raw).unwrap();
        assert_eq!(raw, before);
    }

    #[test]
    fn unknown_risk_label_and_severity_fall_back() {
        let raw = json!({
            "drug": "WARFARIN",
            "risk_assessment": {
                "risk_label": "Surprising",
                "confidence_score": 0.5,
                "severity": "catastrophic"
            }
        });

        let view = normalize(&raw).unwrap();
        assert_eq!(view.results[0].risk_assessment.risk_label, RiskLabel::Unknown);
        assert_eq!(
            view.results[0].risk_assessment.severity,
            Severity::Unspecified
        );
    }

    #[test]
    fn confidence_score_is_clamped() {
        let raw = json!({
            "drug": "WARFARIN",
            "risk_assessment": {"risk_label": "Safe", "confidence_score": 1.7, "severity": "none"}
        });
        let view = normalize(&raw).unwrap();
        assert_eq!(view.results[0].risk_assessment.confidence_score, 1.0);

        let raw = json!({
            "drug": "WARFARIN",
            "risk_assessment": {"risk_label": "Safe", "confidence_score": -0.2, "severity": "none"}
        });
        let view = normalize(&raw).unwrap();
        assert_eq!(view.results[0].risk_assessment.confidence_score, 0.0);
    }

    #[test]
    fn empty_results_array_is_an_error() {
        let raw = json!({"patient_id": "P1", "results": []});
        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, PharmaGuardError::EmptyResults));
    }

    #[test]
    fn minimal_wrapped_payload_round_trips_through_typed_view() {
        // The shape used by the service for multi-drug queries, stripped down.
        let raw = json!({
            "results": [
                {"drug": "CODEINE", "risk_assessment": {"risk_label": "Toxic"}},
                {"drug": "WARFARIN", "risk_assessment": {"risk_label": "Safe"}}
            ]
        });

        let view: BatchView = normalize(&raw).unwrap();
        assert_eq!(view.results[0].risk_assessment.risk_label, RiskLabel::Toxic);
        assert_eq!(view.results[1].risk_assessment.risk_label, RiskLabel::Safe);
    }
}

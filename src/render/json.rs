use serde::Serialize;

use crate::error::PharmaGuardError;

pub fn to_pretty<T: Serialize>(value: &T) -> Result<String, PharmaGuardError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::to_pretty;
    use serde_json::json;

    #[test]
    fn to_pretty_serializes_with_indentation() {
        let payload = json!({"drug": "CODEINE", "risk_assessment": {"risk_label": "Toxic"}});
        let rendered = to_pretty(&payload).expect("json");
        assert!(rendered.contains('\n'));
        assert!(rendered.contains("\"drug\": \"CODEINE\""));
    }

    #[test]
    fn pretty_output_round_trips_to_the_original_payload() {
        let payload = json!({
            "patient_id": "PATIENT_1",
            "results": [
                {"drug": "CODEINE", "risk_assessment": {"risk_label": "Toxic", "confidence_score": 0.9}}
            ],
            "overall_risk_summary": "HIGH RISK"
        });

        let rendered = to_pretty(&payload).expect("json");
        let reparsed: serde_json::Value = serde_json::from_str(&rendered).expect("reparse");
        assert_eq!(reparsed, payload);
    }
}

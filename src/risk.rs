//! Aggregate risk classification for the report banner.

use crate::report::{DrugResult, RiskLabel};

/// Overall severity tier for a batch of results. Chooses banner presentation
/// only; stored data is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallRisk {
    Critical,
    Caution,
    Reassuring,
}

impl OverallRisk {
    pub fn headline(self) -> &'static str {
        match self {
            OverallRisk::Critical => "CRITICAL",
            OverallRisk::Caution => "CAUTION",
            OverallRisk::Reassuring => "REASSURING",
        }
    }
}

/// Highest-priority label wins, independent of result order: any `Toxic`
/// result is Critical; else any `Adjust Dosage` or `Ineffective` is Caution;
/// everything else (all `Safe`, or only `Unknown` labels) is Reassuring.
pub fn aggregate(results: &[DrugResult]) -> OverallRisk {
    let labels = results.iter().map(|r| r.risk_assessment.risk_label);

    if labels.clone().any(|l| l == RiskLabel::Toxic) {
        return OverallRisk::Critical;
    }
    if labels
        .clone()
        .any(|l| matches!(l, RiskLabel::AdjustDosage | RiskLabel::Ineffective))
    {
        return OverallRisk::Caution;
    }
    OverallRisk::Reassuring
}

#[cfg(test)]
mod tests {
    use super::{OverallRisk, aggregate};
    use crate::report::{DrugResult, RiskLabel};

    fn result(label: RiskLabel) -> DrugResult {
        let mut result = DrugResult::default();
        result.risk_assessment.risk_label = label;
        result
    }

    #[test]
    fn any_toxic_is_critical() {
        let results = vec![
            result(RiskLabel::Safe),
            result(RiskLabel::Toxic),
            result(RiskLabel::AdjustDosage),
        ];
        assert_eq!(aggregate(&results), OverallRisk::Critical);
    }

    #[test]
    fn adjust_dosage_or_ineffective_is_caution() {
        assert_eq!(
            aggregate(&[result(RiskLabel::Safe), result(RiskLabel::AdjustDosage)]),
            OverallRisk::Caution
        );
        assert_eq!(
            aggregate(&[result(RiskLabel::Ineffective)]),
            OverallRisk::Caution
        );
    }

    #[test]
    fn all_safe_is_reassuring() {
        assert_eq!(
            aggregate(&[result(RiskLabel::Safe), result(RiskLabel::Safe)]),
            OverallRisk::Reassuring
        );
    }

    #[test]
    fn all_unknown_falls_through_to_reassuring() {
        // Matches service behavior today; clinically questionable, tracked in
        // DESIGN.md as an open question.
        assert_eq!(
            aggregate(&[result(RiskLabel::Unknown), result(RiskLabel::Unknown)]),
            OverallRisk::Reassuring
        );
    }

    #[test]
    fn classification_is_order_independent() {
        let forward = vec![
            result(RiskLabel::Safe),
            result(RiskLabel::Ineffective),
            result(RiskLabel::Toxic),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        assert_eq!(aggregate(&forward), aggregate(&reversed));
        assert_eq!(aggregate(&forward), OverallRisk::Critical);
    }
}

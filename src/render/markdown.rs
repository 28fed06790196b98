//! Markdown report view for the terminal.

use std::fmt::Write as _;

use crate::report::{BatchView, DrugResult};
use crate::risk::OverallRisk;

/// Per-card expand/collapse state for one report. First card in display order
/// starts expanded; toggles are independent and live only as long as the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardExpansion {
    expanded: Vec<bool>,
}

impl CardExpansion {
    pub fn for_results(len: usize) -> Self {
        let mut expanded = vec![false; len];
        if let Some(first) = expanded.first_mut() {
            *first = true;
        }
        Self { expanded }
    }

    pub fn expand_all(len: usize) -> Self {
        Self {
            expanded: vec![true; len],
        }
    }

    pub fn toggle(&mut self, index: usize) {
        if let Some(card) = self.expanded.get_mut(index) {
            *card = !*card;
        }
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.get(index).copied().unwrap_or(false)
    }
}

fn banner_marker(overall: OverallRisk) -> &'static str {
    match overall {
        OverallRisk::Critical => "🔴",
        OverallRisk::Caution => "🟡",
        OverallRisk::Reassuring => "🟢",
    }
}

pub fn render_report(view: &BatchView, overall: OverallRisk, expansion: &CardExpansion) -> String {
    let mut out = String::new();
    out.push_str("# PharmaGuard Report\n\n");

    if let Some(patient_id) = &view.patient_id {
        let _ = writeln!(
            out,
            "**Patient:** {patient_id} · {} drug{} analyzed",
            view.results.len(),
            if view.results.len() == 1 { "" } else { "s" }
        );
    }
    if let Some(timestamp) = &view.timestamp {
        let _ = writeln!(out, "**Analyzed:** {timestamp}");
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "{} **Overall risk: {}**",
        banner_marker(overall),
        overall.headline()
    );
    if let Some(summary) = &view.overall_risk_summary {
        let _ = writeln!(out, "> {summary}");
    }
    out.push('\n');

    out.push_str("## Drug-Gene Interaction Results\n\n");
    for (index, result) in view.results.iter().enumerate() {
        if expansion.is_expanded(index) {
            render_expanded(&mut out, result);
        } else {
            render_collapsed(&mut out, result);
        }
    }

    out.push_str(
        "---\nPharmaGuard is a clinical decision support tool. Results should be \
         interpreted by qualified healthcare professionals.\n",
    );
    out
}

fn headline_line(result: &DrugResult) -> String {
    let profile = &result.pharmacogenomic_profile;
    format!(
        "{} → {} · {} · {} · {} ({}, {:.0}% confidence)",
        result.drug,
        profile.primary_gene,
        profile.diplotype,
        profile.phenotype,
        result.risk_assessment.risk_label,
        result.risk_assessment.severity,
        result.risk_assessment.confidence_score * 100.0
    )
}

fn render_collapsed(out: &mut String, result: &DrugResult) {
    let _ = writeln!(out, "- {}", headline_line(result));
}

fn render_expanded(out: &mut String, result: &DrugResult) {
    let _ = writeln!(out, "### {}\n", headline_line(result));

    let profile = &result.pharmacogenomic_profile;
    if !profile.detected_variants.is_empty() {
        out.push_str("| Variant | Gene | Location | Change | Star Allele |\n");
        out.push_str("|---------|------|----------|--------|-------------|\n");
        for variant in &profile.detected_variants {
            let _ = writeln!(
                out,
                "| {} | {} | chr{}:{} | {}>{} | {} |",
                variant.id.as_deref().unwrap_or("-"),
                variant.gene.as_deref().unwrap_or("-"),
                variant.chrom,
                variant.pos,
                variant.reference,
                variant.alt,
                variant.star_allele.as_deref().unwrap_or("-"),
            );
        }
        out.push('\n');
    }

    let recommendation = &result.clinical_recommendation;
    if !recommendation.action.is_empty() {
        let _ = writeln!(out, "**Recommendation:** {}", recommendation.action);
    }
    if !recommendation.notes.is_empty() {
        let _ = writeln!(out, "{}", recommendation.notes);
    }

    if let Some(explanation) = &result.llm_generated_explanation {
        if let Some(summary) = &explanation.summary {
            let _ = writeln!(out, "\n**Summary:** {summary}");
        }
        if let Some(mechanism) = &explanation.mechanism {
            let _ = writeln!(out, "**Mechanism:** {mechanism}");
        }
        if let Some(impact) = &explanation.clinical_impact {
            let _ = writeln!(out, "**Clinical impact:** {impact}");
        }
    }

    if !result.quality_metrics.vcf_parsing_success {
        out.push_str("\n⚠ VCF parsing failed; assessment is based on defaults.\n");
    }
    out.push('\n');
}

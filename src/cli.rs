//! Command-line surface and dispatch.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::catalog::{Drug, DrugSelection};
use crate::render::markdown::CardExpansion;
use crate::sources::pharmaguard::AnalysisClient;
use crate::submit::{
    AnalysisOutcome, AnalysisRequest, SubmissionCycle, SubmissionState, UploadFile,
};

#[derive(Parser)]
#[command(
    name = "pharmaguard",
    version,
    about = "Pharmacogenomic risk reports from patient VCF files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Analysis service base URL (overrides PHARMAGUARD_API_BASE)
    #[arg(long, global = true, value_name = "URL")]
    pub api_base: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a patient VCF file against selected drugs
    Analyze {
        /// Path to the .vcf file (max 5MB)
        file: PathBuf,

        /// Comma-separated drug codes, e.g. CODEINE,WARFARIN
        #[arg(long, value_name = "CODES", conflicts_with = "all")]
        drugs: Option<String>,

        /// Analyze the full drug catalog
        #[arg(long)]
        all: bool,

        /// Patient identifier to attach to the request
        #[arg(long, value_name = "ID")]
        patient_id: Option<String>,

        /// Print the raw server response as pretty JSON instead of the report
        #[arg(long)]
        json: bool,

        /// Write the raw server response to PATH (default: pharmaguard_{patient}_{date}.json)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        out: Option<Option<PathBuf>>,

        /// Expand every drug card instead of only the first
        #[arg(long)]
        expand_all: bool,
    },

    /// Run a demo analysis against synthetic patient data (no VCF needed)
    Demo {
        /// Comma-separated drug codes, e.g. CODEINE,WARFARIN
        #[arg(long, value_name = "CODES", conflicts_with = "all")]
        drugs: Option<String>,

        /// Analyze the full drug catalog
        #[arg(long)]
        all: bool,

        /// Print the raw server response as pretty JSON instead of the report
        #[arg(long)]
        json: bool,

        /// Write the raw server response to PATH (default: pharmaguard_{patient}_{date}.json)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        out: Option<Option<PathBuf>>,

        /// Expand every drug card instead of only the first
        #[arg(long)]
        expand_all: bool,
    },

    /// List the supported drug catalog and associated pharmacogenes
    Drugs,

    /// Check analysis service availability
    Health,
}

pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let client = match cli.api_base {
        Some(base) => AnalysisClient::with_base(base)?,
        None => AnalysisClient::new()?,
    };

    match cli.command {
        Commands::Analyze {
            file,
            drugs,
            all,
            patient_id,
            json,
            out,
            expand_all,
        } => {
            let content = tokio::fs::read(&file)
                .await
                .map_err(|err| anyhow::anyhow!("cannot read {}: {err}", file.display()))?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let request = AnalysisRequest::FileUpload {
                file: UploadFile { name, content },
                drugs: selection_from_flags(drugs.as_deref(), all)?,
                patient_id,
            };
            let outcome = drive_submission(client, request, true).await?;
            finish_output(outcome, json, out, expand_all).await
        }

        Commands::Demo {
            drugs,
            all,
            json,
            out,
            expand_all,
        } => {
            let request = AnalysisRequest::Demo {
                drugs: selection_from_flags(drugs.as_deref(), all)?,
            };
            let outcome = drive_submission(client, request, false).await?;
            finish_output(outcome, json, out, expand_all).await
        }

        Commands::Drugs => Ok(render_catalog()),

        Commands::Health => {
            let health = client.health().await?;
            let mut out = String::new();
            out.push_str("# PharmaGuard Service Health\n\n");
            let _ = writeln!(out, "Status: {} ({} v{})", health.status, health.service, health.version);
            let _ = writeln!(out, "Supported drugs: {}", health.supported_drugs.join(", "));
            let _ = writeln!(out, "Supported genes: {}", health.supported_genes.join(", "));
            let _ = writeln!(
                out,
                "LLM explanations: {}",
                if health.llm_available { "available" } else { "unavailable" }
            );
            Ok(out)
        }
    }
}

fn selection_from_flags(drugs: Option<&str>, all: bool) -> anyhow::Result<DrugSelection> {
    if all {
        return Ok(DrugSelection::all());
    }
    match drugs {
        Some(list) => Ok(DrugSelection::parse_list(list)?),
        // Empty selection falls through to the submission gate, which blocks
        // with the user-facing message.
        None => Ok(DrugSelection::new()),
    }
}

async fn drive_submission(
    client: AnalysisClient,
    request: AnalysisRequest,
    track_progress: bool,
) -> anyhow::Result<AnalysisOutcome> {
    let mut cycle = SubmissionCycle::new(client);

    let watcher = track_progress.then(|| {
        let mut progress = cycle.progress();
        tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let pct = *progress.borrow_and_update();
                if pct > 0 {
                    info!(progress = pct, "upload progress");
                }
            }
        })
    });

    let outcome = match cycle.submit(request).await {
        SubmissionState::Success(outcome) => Ok((**outcome).clone()),
        SubmissionState::Failed(message) => Err(anyhow::anyhow!("{message}")),
        // submit always lands in a terminal state.
        other => Err(anyhow::anyhow!("unexpected submission state: {other:?}")),
    };

    if let Some(watcher) = watcher {
        watcher.abort();
    }
    outcome
}

async fn finish_output(
    outcome: AnalysisOutcome,
    json: bool,
    out: Option<Option<PathBuf>>,
    expand_all: bool,
) -> anyhow::Result<String> {
    if let Some(path) = out {
        let path = path.unwrap_or_else(|| crate::export::default_report_path(&outcome.raw));
        crate::export::write_report(&path, &outcome.raw).await?;
        info!(path = %path.display(), "report written");
    }

    if json {
        return Ok(crate::render::json::to_pretty(&outcome.raw)?);
    }

    let expansion = if expand_all {
        CardExpansion::expand_all(outcome.report.results.len())
    } else {
        CardExpansion::for_results(outcome.report.results.len())
    };
    Ok(crate::render::markdown::render_report(
        &outcome.report,
        outcome.overall,
        &expansion,
    ))
}

fn render_catalog() -> String {
    let mut out = String::new();
    out.push_str("# Supported Drugs\n\n");
    out.push_str("| Drug | Gene |\n");
    out.push_str("|------|------|\n");
    for drug in Drug::ALL {
        let _ = writeln!(out, "| {} | {} |", drug.code(), drug.gene());
    }
    out
}

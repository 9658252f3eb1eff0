use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod charts;
mod error;
mod models;
mod pipeline;
mod report;
mod sentiment;
mod wordcloud;

use crate::models::SentimentCategory;
use crate::pipeline::Analysis;
use crate::sentiment::{LexiconScorer, SentimentScorer};

const REPORT_FILE: &str = "report.md";
const JSON_FILE: &str = "analysis.json";

#[derive(Parser)]
#[command(name = "customer-feedback-analysis")]
#[command(about = "Sentiment and rating dashboard for customer feedback CSV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and write the report and charts
    Analyze {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, env = "FEEDBACK_OUT_DIR", default_value = "feedback-report")]
        out_dir: PathBuf,
        #[arg(long, default_value_t = 5)]
        preview_rows: usize,
        /// Also write the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print sentiment counts and monthly ratings without writing files
    Summary {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Score a single piece of text
    Score {
        #[arg(long)]
        text: String,
    },
}

fn read_csv(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_json(analysis: &Analysis, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, analysis)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "customer_feedback_analysis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let scorer = LexiconScorer::new();

    match cli.command {
        Commands::Analyze {
            csv,
            out_dir,
            preview_rows,
            json,
        } => {
            let raw = read_csv(&csv)?;
            let table = pipeline::parse(&raw)?;
            let outcome = pipeline::analyze(&table, &scorer);

            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;

            let artifacts = match &outcome {
                Ok(analysis) => charts::render_all(analysis, &out_dir),
                Err(_) => charts::Artifacts::default(),
            };

            let report = report::build_report(&table, preview_rows, &outcome, &artifacts);
            let report_path = out_dir.join(REPORT_FILE);
            std::fs::write(&report_path, report)
                .with_context(|| format!("failed to write {}", report_path.display()))?;
            info!(path = %report_path.display(), "wrote report");

            let analysis = outcome?;
            if json {
                let json_path = out_dir.join(JSON_FILE);
                write_json(&analysis, &json_path)?;
                info!(path = %json_path.display(), "wrote analysis json");
            }

            println!(
                "Analyzed {} reviews from {}; report written to {}.",
                analysis.category_counts.total(),
                csv.display(),
                report_path.display()
            );
        }
        Commands::Summary { csv } => {
            let raw = read_csv(&csv)?;
            let analysis = pipeline::process(&raw, &scorer)?;
            print!("{}", report::build_summary(&analysis));
        }
        Commands::Score { text } => {
            let score = scorer.score(&text);
            println!(
                "{:.3} ({})",
                score,
                SentimentCategory::from_score(score).as_str()
            );
        }
    }

    Ok(())
}

//! Report-pager CLI: paginate a report description offline.
//! The main interface is through WASM bindings.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use report_pager::render::render_document;
use report_pager::{PaginationConfig, Paginator, ReportDocument, TextMetricsMeasure};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Html,
}

/// Paginate a report with estimated text metrics
#[derive(Debug, Parser)]
#[command(name = "report-pager", version)]
struct Cli {
    /// Report description (JSON)
    input: PathBuf,

    /// Pagination config (JSON, partial allowed)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "html")]
    format: Format,

    /// Frame height of every page
    #[arg(long, default_value_t = 960.0)]
    page_height: f32,

    /// Width of the content region
    #[arg(long, default_value_t = 680.0)]
    content_width: f32,

    /// Log each cascade step
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "report_pager=debug" } else { "report_pager=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            PaginationConfig::from_json(&json).with_context(|| format!("loading {}", path.display()))?
        }
        None => PaginationConfig::default(),
    };

    let json = fs::read_to_string(&cli.input).with_context(|| format!("reading {}", cli.input.display()))?;
    let mut doc = ReportDocument::from_json(&json).context("parsing report")?;

    let mut measure = TextMetricsMeasure::default();
    measure.frame_height = cli.page_height;
    measure.content_width = cli.content_width;

    let summary = Paginator::new(config).paginate(&mut doc, &measure);
    if let Some(err) = &summary.aborted {
        log::warn!("pagination aborted: {err}");
    }
    eprintln!("{}", summary.to_json());

    let output = match cli.format {
        Format::Json => doc.to_input().to_json()?,
        Format::Html => render_document(&doc),
    };
    println!("{output}");
    Ok(())
}

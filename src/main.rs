use anyhow::{Context, Result};
use bibdigest::config::{Provider, ServiceConfig, DEFAULT_WORKERS};
use bibdigest::summarizer::SummaryLanguage;
use bibdigest::digest_bibliography;
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Summarize (and optionally translate) the papers of a BibTeX file into a CSV table
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input BibTeX file
    input_bib: PathBuf,
    /// Output CSV file
    output_csv: PathBuf,
    /// Summary language: `en` for English summaries, `ja` for Japanese translation and summaries
    #[arg(short, long, value_enum, default_value = "en")]
    language: SummaryLanguage,
    /// Chat-completion API flavour
    #[arg(short, long, value_enum, default_value = "openai")]
    provider: Provider,
    /// Model name (or Azure deployment name)
    #[arg(short, long)]
    model: Option<String>,
    /// Number of concurrent requests to the model service
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configure logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = ServiceConfig::from_env(args.provider, args.model.clone())
        .context("Failed to configure the model service")?;

    let report = digest_bibliography(
        &args.input_bib,
        &args.output_csv,
        config,
        args.language,
        args.workers,
    )
    .with_context(|| {
        format!(
            "Failed to digest {:?} into {:?}",
            args.input_bib, args.output_csv
        )
    })?;

    info!(
        "Output written to {:?}: {} entries, {} summarized, {} empty",
        args.output_csv, report.total, report.summarized, report.fallbacks
    );

    Ok(())
}

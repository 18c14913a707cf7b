use std::path::Path;

use log::info;

use crate::bibtex;
use crate::config::ServiceConfig;
use crate::error::BibDigestError;
use crate::pipeline::EnrichmentPipeline;
use crate::sink;
use crate::summarizer::{ChatSummarizer, Summarizer, SummaryLanguage};

/// Counts from one run, for the caller to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestReport {
    pub total: usize,
    pub summarized: usize,
    pub fallbacks: usize,
}

/// Load a BibTeX file, summarize every entry with `summarizer` and write the CSV.
///
/// The output file is only touched once every entry has been processed.
pub fn digest_with<S>(
    input: &Path,
    output: &Path,
    summarizer: &S,
    workers: usize,
) -> Result<DigestReport, BibDigestError>
where
    S: Summarizer + ?Sized,
{
    let records = bibtex::load(input)?;
    let pipeline = EnrichmentPipeline::new(workers)?;
    let enriched = pipeline.run(summarizer, &records);
    sink::write_csv(output, &enriched, summarizer.language())?;

    let fallbacks = enriched.iter().filter(|r| r.is_fallback()).count();
    Ok(DigestReport {
        total: enriched.len(),
        summarized: enriched.len() - fallbacks,
        fallbacks,
    })
}

/// Full run against the configured chat-completion service
pub fn digest_bibliography(
    input: &Path,
    output: &Path,
    config: ServiceConfig,
    language: SummaryLanguage,
    workers: usize,
) -> Result<DigestReport, BibDigestError> {
    let summarizer = ChatSummarizer::new(config, language)?;
    info!(
        "Using model '{}' at {} ({:?} summaries)",
        summarizer.config().model,
        summarizer.config().completions_url(),
        language
    );
    digest_with(input, output, &summarizer, workers)
}

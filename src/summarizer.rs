//! Summarizer client: turns one bibliography record into an enriched record.

pub mod chat;
pub mod prompt;

use clap::ValueEnum;
use log::warn;

use crate::bibtex::RawRecord;
use crate::error::SummaryError;

pub use chat::ChatSummarizer;

/// Output variant: plain English summary, or Japanese translation plus summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SummaryLanguage {
    #[value(name = "en")]
    English,
    #[value(name = "ja")]
    Japanese,
}

impl SummaryLanguage {
    /// Summary fields the model is asked to produce, in schema order
    pub fn summary_fields(self) -> &'static [&'static str] {
        match self {
            Self::English => &["background", "purpose", "proposal", "evaluation", "result"],
            Self::Japanese => &[
                "title_ja",
                "abstract_ja",
                "background",
                "purpose",
                "proposal",
                "evaluation",
                "result",
            ],
        }
    }

    /// CSV columns written by the sink, in order
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::English => &[
                "title",
                "authors",
                "abstract",
                "background",
                "purpose",
                "proposal",
                "evaluation",
                "result",
                "doi",
            ],
            Self::Japanese => &[
                "title",
                "authors",
                "abstract",
                "title_ja",
                "abstract_ja",
                "background",
                "purpose",
                "proposal",
                "evaluation",
                "result",
                "doi",
            ],
        }
    }
}

/// Translated title and abstract, present only for the Japanese variant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    pub title_ja: String,
    pub abstract_ja: String,
}

/// The fixed-shape summary of one paper.
///
/// Either every field came from the model or every field is empty; a
/// failed call never leaves a partially filled summary behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredSummary {
    pub translation: Option<Translation>,
    pub background: String,
    pub purpose: String,
    pub proposal: String,
    pub evaluation: String,
    pub result: String,
}

impl StructuredSummary {
    /// The all-empty summary for a language
    pub fn empty(language: SummaryLanguage) -> Self {
        Self {
            translation: match language {
                SummaryLanguage::English => None,
                SummaryLanguage::Japanese => Some(Translation::default()),
            },
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        let translation_empty = self
            .translation
            .as_ref()
            .map_or(true, |t| t.title_ja.is_empty() && t.abstract_ja.is_empty());
        translation_empty
            && self.background.is_empty()
            && self.purpose.is_empty()
            && self.proposal.is_empty()
            && self.evaluation.is_empty()
            && self.result.is_empty()
    }

    /// Value of a summary field by its column name
    pub fn field(&self, name: &str) -> Option<&str> {
        let value: &str = match name {
            "title_ja" => self.translation.as_ref().map_or("", |t| t.title_ja.as_str()),
            "abstract_ja" => self.translation.as_ref().map_or("", |t| t.abstract_ja.as_str()),
            "background" => &self.background,
            "purpose" => &self.purpose,
            "proposal" => &self.proposal,
            "evaluation" => &self.evaluation,
            "result" => &self.result,
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStatus {
    Summarized,
    /// The call failed and the summary was left empty
    Fallback,
}

/// A record merged with its summary; one output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub record: RawRecord,
    pub summary: StructuredSummary,
    pub status: SummaryStatus,
}

impl EnrichedRecord {
    pub fn summarized(record: RawRecord, summary: StructuredSummary) -> Self {
        Self {
            record,
            summary,
            status: SummaryStatus::Summarized,
        }
    }

    pub fn fallback(record: RawRecord, language: SummaryLanguage) -> Self {
        Self {
            record,
            summary: StructuredSummary::empty(language),
            status: SummaryStatus::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.status == SummaryStatus::Fallback
    }

    /// Value of an output column; unknown columns read as empty
    pub fn column(&self, name: &str) -> &str {
        match name {
            "title" => self.record.title(),
            "authors" => self.record.authors(),
            "abstract" => self.record.abstract_text(),
            "doi" => self.record.identifier(),
            other => self.summary.field(other).unwrap_or(""),
        }
    }

    /// One CSV row in the column order of `language`
    pub fn row(&self, language: SummaryLanguage) -> Vec<&str> {
        language.columns().iter().map(|c| self.column(c)).collect()
    }
}

/// Produces structured summaries for bibliography records.
///
/// Implementors provide the fallible remote call; `summarize` wraps it so
/// that a worker task always completes with a record. This covers returned
/// errors only: a panic inside `request_summary` unwinds through the
/// pipeline and aborts the run.
pub trait Summarizer: Sync {
    fn language(&self) -> SummaryLanguage;

    fn request_summary(&self, record: &RawRecord) -> Result<StructuredSummary, SummaryError>;

    fn summarize(&self, record: &RawRecord) -> EnrichedRecord {
        match self.request_summary(record) {
            Ok(summary) => EnrichedRecord::summarized(record.clone(), summary),
            Err(e) => {
                warn!("Error processing abstract for '{}': {}", record.title(), e);
                EnrichedRecord::fallback(record.clone(), self.language())
            }
        }
    }
}

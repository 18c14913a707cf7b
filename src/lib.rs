//! Summarize the papers of a BibTeX bibliography into a CSV table.
//!
//! Entries are read from a BibTeX file ([`bibtex`]), sent to a
//! chat-completion model that fills a fixed set of summary fields
//! ([`summarizer`]) on a bounded worker pool ([`pipeline`]), and written
//! in input order to CSV ([`sink`]).

pub mod bibtex;
pub mod config;
pub mod error;
pub mod internal;
pub mod pipeline;
pub mod sink;
pub mod summarizer;

pub use bibtex::{RawRecord, RawRecordBuilder};
pub use config::{Provider, ServiceConfig};
pub use error::{BibDigestError, SummaryError};
pub use internal::{digest_bibliography, digest_with, DigestReport};
pub use pipeline::EnrichmentPipeline;
pub use summarizer::{
    ChatSummarizer, EnrichedRecord, StructuredSummary, Summarizer, SummaryLanguage, SummaryStatus,
    Translation,
};

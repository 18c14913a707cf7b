//! Bounded concurrent enrichment of bibliography records.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::bibtex::RawRecord;
use crate::error::BibDigestError;
use crate::summarizer::{EnrichedRecord, Summarizer};

/// Runs a summarizer over many records on a fixed-size worker pool.
///
/// At most `workers` summarizer calls are in flight at any moment, however
/// many records there are. Every record is its own job on the pool, so an
/// idle worker picks up the next pending record instead of waiting behind
/// a slow call. Results come back in input order: each job writes into the
/// output slot matching its index, so completion order never shows up in
/// the result.
pub struct EnrichmentPipeline {
    pool: ThreadPool,
    workers: usize,
}

impl EnrichmentPipeline {
    pub fn new(workers: usize) -> Result<Self, BibDigestError> {
        if workers == 0 {
            return Err(BibDigestError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("summarizer-{}", i))
            .build()?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Summarize every record and return one enriched record per input.
    ///
    /// Blocks until all tasks have completed. Tasks cannot fail: a failed
    /// call already came back from the summarizer as an empty summary.
    pub fn run<S>(&self, summarizer: &S, records: &[RawRecord]) -> Vec<EnrichedRecord>
    where
        S: Summarizer + ?Sized,
    {
        let total = records.len();
        info!(
            "Summarizing {} entries with {} worker(s)",
            total, self.workers
        );

        let completed = AtomicUsize::new(0);
        let mut slots: Vec<Option<EnrichedRecord>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        self.pool.scope(|scope| {
            for (index, (slot, record)) in slots.iter_mut().zip(records).enumerate() {
                let completed = &completed;
                scope.spawn(move |_| {
                    let enriched = summarizer.summarize(record);
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    info!("Processed entry {} ({}/{})", index + 1, done, total);
                    *slot = Some(enriched);
                });
            }
        });
        let output: Vec<EnrichedRecord> = slots.into_iter().flatten().collect();

        let fallbacks = output.iter().filter(|r| r.is_fallback()).count();
        info!(
            "Summarized {}/{} entries ({} left empty after errors)",
            total - fallbacks,
            total,
            fallbacks
        );
        output
    }
}

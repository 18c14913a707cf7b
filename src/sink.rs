//! CSV sink for enriched records.

use std::io;
use std::path::Path;

use csv::Writer;
use log::info;

use crate::error::BibDigestError;
use crate::summarizer::{EnrichedRecord, SummaryLanguage};

/// Write the header row and one row per record to any writer
pub fn write_records<W: io::Write>(
    writer: W,
    records: &[EnrichedRecord],
    language: SummaryLanguage,
) -> Result<(), csv::Error> {
    let mut csv_writer = Writer::from_writer(writer);
    csv_writer.write_record(language.columns())?;
    for record in records {
        csv_writer.write_record(record.row(language))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write records to a CSV file, replacing it if it exists
pub fn write_csv(
    path: &Path,
    records: &[EnrichedRecord],
    language: SummaryLanguage,
) -> Result<(), BibDigestError> {
    let to_error = |source: csv::Error| BibDigestError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path).map_err(|e| to_error(e.into()))?;
    write_records(file, records, language).map_err(to_error)?;
    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

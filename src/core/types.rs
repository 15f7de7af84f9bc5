// Shared types flowing between the pipeline and the service clients

use serde::{Deserialize, Serialize};

/// Listing entry for one stored object. Only the name is consulted before the
/// media download.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectEntry {
    pub name: String,
}

/// First text annotation reported by OCR for one image.
///
/// `locale` is the detected language code ("en", "fr", ...); the service may
/// omit it, in which case it defaults to the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub text: String,
    pub locale: String,
}

/// One output row, exactly as inserted into the warehouse table.
///
/// Immutable once appended to the result buffer; the buffer is consumed by a
/// single bulk insert at the end of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedRecord {
    pub original_text: String,
    pub locale: String,
    pub translated_text: String,
    pub filename: String,
}

/// Per-row failure reported by the bulk insert. An empty list from the insert
/// call means every row was accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct RowError {
    pub index: usize,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub message: String,
}

/// Counters for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Every object the listing returned, matching or not
    pub objects_seen: usize,
    /// Images that yielded at least one annotation and became a record
    pub images_processed: usize,
    /// Images OCR looked at but found no text in
    pub skipped_no_text: usize,
    /// Rows handed to the bulk insert
    pub records_inserted: usize,
    /// Row-level errors the insert reported back
    pub insert_errors: usize,
}

// Pipeline: the single-pass driving loop
//
// Guard → list → (filter → fetch → detect → translate → buffer)* → one bulk
// insert. Strictly sequential; every network call completes before the next
// object is touched.

use std::sync::Arc;

use tracing::debug;

use crate::core::errors::{PipelineError, PipelineResult};
use crate::core::types::{ProcessedRecord, RunSummary};
use crate::services::{ObjectStorage, RecordSink, TextDetector, TextTranslator};

/// Language code that short-circuits translation.
pub const TARGET_LANGUAGE: &str = "fr";

const IMAGE_SUFFIXES: [&str; 2] = ["jpg", "png"];

/// Plain suffix match, not extension parsing: "notjpg" matches, ".JPG" does
/// not.
pub fn is_image_name(name: &str) -> bool {
    IMAGE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Single-run batch pipeline over injected collaborators.
pub struct Pipeline {
    storage: Arc<dyn ObjectStorage>,
    detector: Arc<dyn TextDetector>,
    translator: Arc<dyn TextTranslator>,
    sink: Arc<dyn RecordSink>,
}

impl Pipeline {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        detector: Arc<dyn TextDetector>,
        translator: Arc<dyn TextTranslator>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            storage,
            detector,
            translator,
            sink,
        }
    }

    /// Process the whole bucket once.
    ///
    /// Objects that fail the suffix filter are never fetched; images with no
    /// detected text produce no record; text already in the target language
    /// passes through without a translation call. The buffer is appended in
    /// listing order and flushed in a single insert after the listing is
    /// exhausted. Any service failure aborts the run; row-level insert errors
    /// are reported and do not.
    pub async fn run(&self) -> PipelineResult<RunSummary> {
        println!("Processing image files from the storage bucket. This will take a few minutes...");

        let objects = self
            .storage
            .list_objects()
            .await
            .map_err(PipelineError::Listing)?;
        debug!(total = objects.len(), "bucket listing complete");

        let mut summary = RunSummary::default();
        let mut rows: Vec<ProcessedRecord> = Vec::new();

        for entry in &objects {
            summary.objects_seen += 1;
            if !is_image_name(&entry.name) {
                continue;
            }

            let content = self
                .storage
                .fetch(&entry.name)
                .await
                .map_err(|source| PipelineError::Download {
                    object: entry.name.clone(),
                    source,
                })?;

            let detection = self
                .detector
                .detect_text(&content)
                .await
                .map_err(|source| PipelineError::Detection {
                    object: entry.name.clone(),
                    source,
                })?;

            let Some(detection) = detection else {
                summary.skipped_no_text += 1;
                continue;
            };

            let translated_text = if detection.locale == TARGET_LANGUAGE {
                detection.text.clone()
            } else {
                self.translator
                    .translate(&detection.text, TARGET_LANGUAGE)
                    .await
                    .map_err(|source| PipelineError::Translation {
                        object: entry.name.clone(),
                        source,
                    })?
            };

            println!(
                "File: {}, Locale: {}, Translated: {}",
                entry.name, detection.locale, translated_text
            );

            summary.images_processed += 1;
            rows.push(ProcessedRecord {
                original_text: detection.text,
                locale: detection.locale,
                translated_text,
                filename: entry.name.clone(),
            });
        }

        println!("Writing text detection and translation results to BigQuery...");

        let errors = self
            .sink
            .insert(&rows)
            .await
            .map_err(PipelineError::Insert)?;

        summary.records_inserted = rows.len();
        summary.insert_errors = errors.len();

        if errors.is_empty() {
            println!("✓ Data successfully inserted into BigQuery");
        } else {
            println!("✗ Insert errors occurred: {errors:?}");
        }

        Ok(summary)
    }
}

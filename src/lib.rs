// Library exports for the image text extraction workflow

pub mod core;
pub mod orchestration;
pub mod services;

// Re-export commonly used types and functions
pub use crate::core::{
    config::{Cli, Config},
    errors::{
        AuthError, ConfigError, PipelineError, SinkError, StorageError, TranslateError,
        VisionError,
    },
    types::{Detection, ErrorDetail, ObjectEntry, ProcessedRecord, RowError, RunSummary},
};

pub use orchestration::pipeline::{is_image_name, Pipeline, TARGET_LANGUAGE};

pub use services::{
    BigQueryClient, GcsClient, ObjectStorage, RecordSink, TextDetector, TextTranslator,
    TokenBroker, TranslateClient, VisionClient,
};

// Service clients, one per external collaborator, each behind an injectable trait

pub mod auth;
pub mod bigquery;
pub mod storage;
pub mod translate;
pub mod vision;

pub use auth::TokenBroker;
pub use bigquery::{BigQueryClient, RecordSink};
pub use storage::{GcsClient, ObjectStorage};
pub use translate::{TextTranslator, TranslateClient};
pub use vision::{TextDetector, VisionClient};

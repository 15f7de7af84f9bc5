// Custom error types for better error handling and debugging
//
// Using thiserror for ergonomic error definitions with:
// - Context preservation
// - Type-safe error matching
// - Automatic Display/Error trait implementations
// - Source error chaining

use std::path::PathBuf;

use thiserror::Error;

/// Startup guard errors. All of these abort the run before any client exists.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the GOOGLE_APPLICATION_CREDENTIALS environment variable is not defined")]
    CredentialsUnset,

    #[error("the GOOGLE_APPLICATION_CREDENTIALS file does not exist: {}", .0.display())]
    CredentialsNotFound(PathBuf),
}

/// Token minting errors from the service-account provider
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to load service account credentials: {0}")]
    Credentials(#[source] gcp_auth::Error),

    #[error("failed to mint access token: {0}")]
    Token(#[source] gcp_auth::Error),
}

/// Object store errors (listing and media download)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("token acquisition failed: {0}")]
    Auth(#[from] AuthError),

    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("object store returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode listing response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Text detection service errors
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("token acquisition failed: {0}")]
    Auth(#[from] AuthError),

    #[error("annotation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("vision service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode annotation response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("vision service reported error {code}: {message}")]
    Api { code: i32, message: String },

    #[error("annotation response carried no per-image result")]
    MissingResponse,
}

/// Translation service errors
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("token acquisition failed: {0}")]
    Auth(#[from] AuthError),

    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translation service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode translation response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("translation response carried no translations")]
    MissingTranslation,
}

/// Warehouse sink errors (table lookup and bulk insert)
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("token acquisition failed: {0}")]
    Auth(#[from] AuthError),

    #[error("warehouse request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("warehouse returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode insert response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("destination table {dataset}.{table} not found")]
    TableNotFound { dataset: String, table: String },
}

/// Run-level errors: a service error plus the object that was being processed
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("listing bucket failed: {0}")]
    Listing(#[source] StorageError),

    #[error("downloading {object} failed: {source}")]
    Download {
        object: String,
        #[source]
        source: StorageError,
    },

    #[error("text detection on {object} failed: {source}")]
    Detection {
        object: String,
        #[source]
        source: VisionError,
    },

    #[error("translating text from {object} failed: {source}")]
    Translation {
        object: String,
        #[source]
        source: TranslateError,
    },

    #[error("bulk insert failed: {0}")]
    Insert(#[source] SinkError),
}

// Convenience type aliases for Results
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type PipelineResult<T> = Result<T, PipelineError>;

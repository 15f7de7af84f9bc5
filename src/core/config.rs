use std::env;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::Level;

use crate::core::errors::{ConfigError, ConfigResult};

/// Environment variable naming the service-account credentials file.
pub const CREDENTIALS_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Command-line arguments: the project owning the destination dataset and the
/// bucket holding the images.
#[derive(Debug, Parser)]
#[command(
    name = "image-text-etl",
    about = "Extract text from bucket images, translate it to French, load the rows into BigQuery"
)]
pub struct Cli {
    /// Google Cloud project that owns the destination dataset
    pub project_id: String,
    /// Storage bucket holding the image files
    pub bucket: String,
}

/// Validated run configuration.
///
/// Construction is the credential/argument guard: it fails before any client
/// is built when the credentials variable is unset or names a missing file.
#[derive(Debug, Clone)]
pub struct Config {
    project_id: String,
    bucket: String,
    credentials_path: PathBuf,
    log_level: Level,
}

impl Config {
    pub fn new(cli: Cli) -> ConfigResult<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let credentials_path = Self::credentials_from_env()?;

        // Parse log level
        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "trace" => Some(Level::TRACE),
                "debug" => Some(Level::DEBUG),
                "info" => Some(Level::INFO),
                "warn" | "warning" => Some(Level::WARN),
                "error" => Some(Level::ERROR),
                _ => None,
            })
            .unwrap_or(Level::INFO);

        Ok(Self {
            project_id: cli.project_id,
            bucket: cli.bucket,
            credentials_path,
            log_level,
        })
    }

    fn credentials_from_env() -> ConfigResult<PathBuf> {
        let raw = env::var(CREDENTIALS_VAR).map_err(|_| ConfigError::CredentialsUnset)?;
        let path = PathBuf::from(raw);
        if !path.exists() {
            return Err(ConfigError::CredentialsNotFound(path));
        }
        Ok(path)
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    pub fn log_level(&self) -> Level {
        self.log_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use std::io::Write;
    use std::sync::Mutex;

    // Environment mutation is process-wide; serialize the tests that touch it.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn cli() -> Cli {
        Cli {
            project_id: "demo-project".into(),
            bucket: "demo-bucket".into(),
        }
    }

    #[test]
    fn missing_credentials_variable_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var(CREDENTIALS_VAR);

        let err = Config::new(cli()).unwrap_err();
        assert!(matches!(err, ConfigError::CredentialsUnset));
    }

    #[test]
    fn nonexistent_credentials_file_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var(CREDENTIALS_VAR, "/definitely/not/a/real/file.json");

        let err = Config::new(cli()).unwrap_err();
        match err {
            ConfigError::CredentialsNotFound(path) => {
                assert_eq!(path, PathBuf::from("/definitely/not/a/real/file.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        env::remove_var(CREDENTIALS_VAR);
    }

    #[test]
    fn existing_credentials_file_passes_the_guard() {
        let _guard = ENV_LOCK.lock().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{}}").unwrap();
        env::set_var(CREDENTIALS_VAR, file.path());

        let config = Config::new(cli()).unwrap();
        assert_eq!(config.project_id(), "demo-project");
        assert_eq!(config.bucket(), "demo-bucket");
        assert_eq!(config.credentials_path(), file.path());
        assert_eq!(config.log_level(), Level::INFO);
        env::remove_var(CREDENTIALS_VAR);
    }

    #[test]
    fn fewer_than_two_positional_arguments_is_a_usage_error() {
        let err = Cli::try_parse_from(["image-text-etl", "only-project"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn two_positional_arguments_parse_in_order() {
        let cli = Cli::try_parse_from(["image-text-etl", "proj", "bucket"]).unwrap();
        assert_eq!(cli.project_id, "proj");
        assert_eq!(cli.bucket, "bucket");
    }
}

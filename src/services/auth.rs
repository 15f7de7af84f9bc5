use std::path::Path;
use std::sync::Arc;

use gcp_auth::{CustomServiceAccount, TokenProvider};
use tracing::debug;

use crate::core::errors::AuthError;

/// Single OAuth scope covering storage, vision, translation and BigQuery.
const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Mints bearer tokens from the validated service-account file.
///
/// Token caching and refresh live in the underlying provider; every client
/// simply asks for a token per request.
#[derive(Clone)]
pub struct TokenBroker {
    provider: Arc<CustomServiceAccount>,
}

impl TokenBroker {
    pub fn from_credentials_file(path: &Path) -> Result<Self, AuthError> {
        let provider = CustomServiceAccount::from_file(path).map_err(AuthError::Credentials)?;
        debug!("service account credentials loaded from {}", path.display());
        Ok(Self {
            provider: Arc::new(provider),
        })
    }

    /// Current bearer token for googleapis calls.
    pub async fn bearer(&self) -> Result<String, AuthError> {
        let token = self
            .provider
            .token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(AuthError::Token)?;
        Ok(token.as_str().to_string())
    }
}

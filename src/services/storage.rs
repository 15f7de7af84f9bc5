use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use tracing::debug;

use crate::core::errors::StorageError;
use crate::core::types::ObjectEntry;
use crate::services::auth::TokenBroker;

const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

// Object names go into the URL path as one segment; everything outside the
// RFC 3986 unreserved set must be escaped, '/' included.
const OBJECT_NAME_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Read access to the object store: full listing plus per-object download.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Every object currently in the bucket, in listing order. The order is a
    /// property of the store and must not be assumed stable across runs.
    async fn list_objects(&self) -> Result<Vec<ObjectEntry>, StorageError>;

    /// Raw byte content of one object.
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, StorageError>;
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<ObjectEntry>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

fn list_url(endpoint: &str, bucket: &str, page_token: Option<&str>) -> String {
    let mut url = format!("{endpoint}/storage/v1/b/{bucket}/o");
    if let Some(token) = page_token {
        url.push_str("?pageToken=");
        url.push_str(&utf8_percent_encode(token, OBJECT_NAME_SET).to_string());
    }
    url
}

fn media_url(endpoint: &str, bucket: &str, name: &str) -> String {
    format!(
        "{endpoint}/storage/v1/b/{bucket}/o/{}?alt=media",
        utf8_percent_encode(name, OBJECT_NAME_SET)
    )
}

/// GCS JSON API client bound to a single bucket.
pub struct GcsClient {
    http: reqwest::Client,
    tokens: TokenBroker,
    endpoint: String,
    bucket: String,
}

impl GcsClient {
    pub fn new(http: reqwest::Client, tokens: TokenBroker, bucket: impl Into<String>) -> Self {
        Self::with_endpoint(http, tokens, bucket, DEFAULT_ENDPOINT)
    }

    /// Same client against a different base URL. Test seam.
    pub fn with_endpoint(
        http: reqwest::Client,
        tokens: TokenBroker,
        bucket: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
        }
    }

    async fn list_page(&self, page_token: Option<&str>) -> Result<ListResponse, StorageError> {
        let token = self.tokens.bearer().await?;
        let response = self
            .http
            .get(list_url(&self.endpoint, &self.bucket, page_token))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Status { status, body });
        }

        let text = response.text().await?;
        let page: ListResponse = serde_json::from_str(&text)?;
        Ok(page)
    }
}

#[async_trait]
impl ObjectStorage for GcsClient {
    async fn list_objects(&self) -> Result<Vec<ObjectEntry>, StorageError> {
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        // The JSON API pages; follow nextPageToken until exhausted.
        // No snapshot isolation: a re-list sees current bucket state.
        loop {
            let page = self.list_page(page_token.as_deref()).await?;
            debug!(bucket = %self.bucket, count = page.items.len(), "listed objects page");
            objects.extend(page.items);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(objects)
    }

    async fn fetch(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let token = self.tokens.bearer().await?;
        let response = self
            .http
            .get(media_url(&self.endpoint, &self.bucket, name))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        debug!(object = name, size = bytes.len(), "downloaded object");
        Ok(bytes.to_vec())
    }
}

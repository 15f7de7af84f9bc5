use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::core::errors::SinkError;
use crate::core::types::{ProcessedRecord, RowError};
use crate::services::auth::TokenBroker;

const DEFAULT_ENDPOINT: &str = "https://bigquery.googleapis.com";

/// Fixed destination table.
pub const DATASET_ID: &str = "image_classification_dataset";
pub const TABLE_ID: &str = "image_text_detail";

/// Append-only warehouse sink for the run's result buffer.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// One bulk insert of the whole buffer. Returns row-level errors; an
    /// empty list means every row was accepted. The insert is not atomic and
    /// is never retried here.
    async fn insert(&self, rows: &[ProcessedRecord]) -> Result<Vec<RowError>, SinkError>;
}

#[derive(Debug, Deserialize)]
struct InsertAllResponse {
    #[serde(rename = "insertErrors", default)]
    insert_errors: Vec<RowError>,
}

fn table_url(endpoint: &str, project: &str) -> String {
    format!("{endpoint}/bigquery/v2/projects/{project}/datasets/{DATASET_ID}/tables/{TABLE_ID}")
}

fn insert_body(rows: &[ProcessedRecord]) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = rows
        .iter()
        .map(|record| serde_json::json!({ "json": record }))
        .collect();
    serde_json::json!({
        "kind": "bigquery#tableDataInsertAllRequest",
        "rows": rows
    })
}

/// BigQuery `tabledata.insertAll` client bound to the fixed table.
pub struct BigQueryClient {
    http: reqwest::Client,
    tokens: TokenBroker,
    endpoint: String,
    project: String,
}

impl BigQueryClient {
    pub fn new(http: reqwest::Client, tokens: TokenBroker, project: impl Into<String>) -> Self {
        Self::with_endpoint(http, tokens, project, DEFAULT_ENDPOINT)
    }

    /// Same client against a different base URL. Test seam.
    pub fn with_endpoint(
        http: reqwest::Client,
        tokens: TokenBroker,
        project: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            project: project.into(),
        }
    }

    /// Verify the destination table exists before any processing starts.
    /// Mirrors the table handle lookup the run performs up front.
    pub async fn resolve_table(&self) -> Result<(), SinkError> {
        let token = self.tokens.bearer().await?;
        let response = self
            .http
            .get(table_url(&self.endpoint, &self.project))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SinkError::TableNotFound {
                dataset: DATASET_ID.to_string(),
                table: TABLE_ID.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Status { status, body });
        }

        debug!(dataset = DATASET_ID, table = TABLE_ID, "destination table resolved");
        Ok(())
    }
}

#[async_trait]
impl RecordSink for BigQueryClient {
    async fn insert(&self, rows: &[ProcessedRecord]) -> Result<Vec<RowError>, SinkError> {
        debug!(rows = rows.len(), "bulk insert");

        let token = self.tokens.bearer().await?;
        let response = self
            .http
            .post(format!(
                "{}/insertAll",
                table_url(&self.endpoint, &self.project)
            ))
            .bearer_auth(token)
            .json(&insert_body(rows))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Status { status, body });
        }

        let text = response.text().await?;
        let parsed: InsertAllResponse = serde_json::from_str(&text)?;
        Ok(parsed.insert_errors)
    }
}

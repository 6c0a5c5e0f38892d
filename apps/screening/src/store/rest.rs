//! REST client for the hosted row API.
//!
//! The backend exposes its tables PostgREST-style: equality and membership
//! filters as query parameters, deletes as filtered DELETE calls. Deleted
//! rows are counted via the returned representation, which is how the
//! success/failure indicator in [`AnalysisStore`] is produced.
//!
//! No retry loop anywhere in this client: every reconciler operation is a
//! single best-effort sequence.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{FileRecord, FolderRecord, RawAnalysisRecord};
use crate::store::AnalysisStore;

const FOLDERS_TABLE: &str = "folders";
const FILES_TABLE: &str = "files";
const ANALYSES_TABLE: &str = "analysis_results";

/// Client for the hosted service's row API.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RestStore {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.http_timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: config.service_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, AppError> {
        let response = self
            .client
            .get(self.table_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::Store {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Issues a filtered DELETE and returns how many rows were removed.
    async fn delete_rows(&self, table: &str, query: &[(&str, String)]) -> Result<u64, AppError> {
        let response = self
            .client
            .delete(self.table_url(table))
            .header("apikey", &self.service_key)
            .header("Prefer", "return=representation")
            .bearer_auth(&self.service_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::Store {
                status: status.as_u16(),
                message,
            });
        }

        let removed: Vec<Value> = response.json().await?;
        debug!("DELETE {table} removed {} row(s)", removed.len());
        Ok(removed.len() as u64)
    }
}

#[async_trait]
impl AnalysisStore for RestStore {
    async fn folder_name(&self, folder_id: &str) -> Result<Option<String>, AppError> {
        let rows: Vec<FolderRecord> = self
            .get_rows(
                FOLDERS_TABLE,
                &[
                    ("id", eq_filter(folder_id)),
                    ("select", "id,name".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(|folder| folder.name))
    }

    async fn files_in_folder(&self, folder_id: &str) -> Result<Vec<FileRecord>, AppError> {
        self.get_rows(
            FILES_TABLE,
            &[
                ("folderId", eq_filter(folder_id)),
                ("select", "id,name,folderId".to_string()),
            ],
        )
        .await
    }

    async fn analyses_for_files(
        &self,
        file_ids: &[String],
    ) -> Result<Vec<RawAnalysisRecord>, AppError> {
        if file_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.get_rows(
            ANALYSES_TABLE,
            &[
                ("file_id", membership_filter(file_ids)),
                ("select", "*".to_string()),
            ],
        )
        .await
    }

    async fn latest_analysis_for_file(
        &self,
        file_id: &str,
        user_id: &str,
    ) -> Result<Option<RawAnalysisRecord>, AppError> {
        let rows: Vec<RawAnalysisRecord> = self
            .get_rows(
                ANALYSES_TABLE,
                &[
                    ("file_id", eq_filter(file_id)),
                    ("userId", eq_filter(user_id)),
                    ("order", "created_at.desc".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn file_by_name(&self, name: &str) -> Result<Option<FileRecord>, AppError> {
        let rows: Vec<FileRecord> = self
            .get_rows(
                FILES_TABLE,
                &[
                    ("name", eq_filter(name)),
                    ("select", "id,name,folderId".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete_by_analysis_id(&self, analysis_id: &str) -> Result<bool, AppError> {
        let removed = self
            .delete_rows(ANALYSES_TABLE, &[("id", eq_filter(analysis_id))])
            .await?;
        Ok(removed > 0)
    }

    async fn delete_by_file_id(&self, file_id: &str) -> Result<bool, AppError> {
        let removed = self
            .delete_rows(ANALYSES_TABLE, &[("file_id", eq_filter(file_id))])
            .await?;
        Ok(removed > 0)
    }
}

fn eq_filter(value: &str) -> String {
    format!("eq.{value}")
}

/// Builds an `in.(...)` membership filter. Each value is quoted so ids
/// containing commas or parentheses survive the filter grammar.
fn membership_filter(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| quote_filter_value(v)).collect();
    format!("in.({})", quoted.join(","))
}

fn quote_filter_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

//! Remote data store contract.
//!
//! The reconciler only ever sees this trait; the bundled [`rest::RestStore`]
//! speaks the hosted service's row API. Swap implementations without
//! touching the reconciler.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{FileRecord, RawAnalysisRecord};

pub mod rest;

pub use rest::RestStore;

/// The remote store the reconciler loads from and deletes against.
///
/// Carried as `Arc<dyn AnalysisStore>` in [`crate::Collaborators`].
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Display name for a folder, if the folder exists.
    async fn folder_name(&self, folder_id: &str) -> Result<Option<String>, AppError>;

    /// All file records in a folder.
    async fn files_in_folder(&self, folder_id: &str) -> Result<Vec<FileRecord>, AppError>;

    /// All analysis records whose `file_id` is in `file_ids`.
    /// One membership query, never a per-file fan-out.
    async fn analyses_for_files(
        &self,
        file_ids: &[String],
    ) -> Result<Vec<RawAnalysisRecord>, AppError>;

    /// The most recent analysis record for one file, scoped to a user.
    async fn latest_analysis_for_file(
        &self,
        file_id: &str,
        user_id: &str,
    ) -> Result<Option<RawAnalysisRecord>, AppError>;

    /// File record by exact name, if any.
    async fn file_by_name(&self, name: &str) -> Result<Option<FileRecord>, AppError>;

    /// Deletes the analysis record with this id.
    /// `Ok(true)` when a row was removed, `Ok(false)` when nothing matched.
    async fn delete_by_analysis_id(&self, analysis_id: &str) -> Result<bool, AppError>;

    /// Deletes every analysis record for this file id.
    async fn delete_by_file_id(&self, file_id: &str) -> Result<bool, AppError>;
}

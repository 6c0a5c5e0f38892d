use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filename shown when an analysis record's file id matches no file record
/// in the folder.
pub const UNKNOWN_FILENAME: &str = "Unknown file";

/// A stored folder row. Only the display name is read here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRecord {
    pub id: String,
    pub name: String,
}

/// A stored file row, scoped to a folder.
/// The backend's column is camel-cased; everything downstream is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "folderId")]
    pub folder_id: String,
}

/// An analysis row exactly as the backend returns it.
///
/// `strengths` and `weaknesses` have been written by several generations of
/// the analysis pipeline and arrive as JSON-encoded text, a plain array, or
/// a keyed object. [`KeywordField`] captures all three at the store
/// boundary; the ambiguity is resolved during ingestion and never escapes
/// the reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAnalysisRecord {
    pub id: String,
    pub file_id: String,
    pub match_score: f64,
    #[serde(default)]
    pub strengths: KeywordField,
    #[serde(default)]
    pub weaknesses: KeywordField,
    pub created_at: DateTime<Utc>,
}

/// The shapes a stored keyword list can take.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum KeywordField {
    /// JSON-encoded text, e.g. `"[\"rust\",\"sql\"]"`.
    Text(String),
    /// A plain array. Non-string elements are skipped during ingestion.
    Seq(Vec<Value>),
    /// A keyed object; values are taken in the map's iteration order.
    Map(serde_json::Map<String, Value>),
    /// Anything else (null, number, bool) normalizes to empty.
    Other(Value),
}

impl Default for KeywordField {
    fn default() -> Self {
        KeywordField::Other(Value::Null)
    }
}

/// A display-ready analysis row, joined against its file record.
///
/// `id` and `file_id` are optional because rows restored from older local
/// snapshots can lack either; the delete flow requires at least one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: Option<String>,
    pub file_id: Option<String>,
    pub folder_id: String,
    pub filename: String,
    pub score: f64,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    /// Not stored by the backend yet; always empty.
    pub recommendations: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}

//! Deletion strategies.
//!
//! A remote delete can be keyed by the analysis id or, as a fallback, by
//! the file id. The strategies form an ordered list tried in sequence
//! until one reports success; a new key space is added by appending to
//! [`DELETE_STRATEGIES`].

use crate::errors::AppError;
use crate::models::AnalysisResult;
use crate::store::AnalysisStore;

/// One remote key space a deletion can be issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStrategy {
    AnalysisId,
    FileId,
}

/// Key spaces in the order they are attempted.
pub const DELETE_STRATEGIES: [DeleteStrategy; 2] =
    [DeleteStrategy::AnalysisId, DeleteStrategy::FileId];

impl DeleteStrategy {
    pub fn label(self) -> &'static str {
        match self {
            DeleteStrategy::AnalysisId => "analysis_id",
            DeleteStrategy::FileId => "file_id",
        }
    }

    /// The key this strategy would delete by, if the result carries it.
    pub fn key(self, result: &AnalysisResult) -> Option<&str> {
        match self {
            DeleteStrategy::AnalysisId => result.id.as_deref(),
            DeleteStrategy::FileId => result.file_id.as_deref(),
        }
    }

    pub async fn attempt(self, store: &dyn AnalysisStore, key: &str) -> Result<bool, AppError> {
        match self {
            DeleteStrategy::AnalysisId => store.delete_by_analysis_id(key).await,
            DeleteStrategy::FileId => store.delete_by_file_id(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_result(id: Option<&str>, file_id: Option<&str>) -> AnalysisResult {
        AnalysisResult {
            id: id.map(str::to_string),
            file_id: file_id.map(str::to_string),
            folder_id: "F1".to_string(),
            filename: "a.pdf".to_string(),
            score: 50.0,
            matched_keywords: Vec::new(),
            missing_keywords: Vec::new(),
            recommendations: Vec::new(),
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn test_strategy_order_is_analysis_id_first() {
        assert_eq!(
            DELETE_STRATEGIES,
            [DeleteStrategy::AnalysisId, DeleteStrategy::FileId]
        );
    }

    #[test]
    fn test_keys_resolve_from_the_matching_field() {
        let result = make_result(Some("r1"), Some("f1"));
        assert_eq!(DeleteStrategy::AnalysisId.key(&result), Some("r1"));
        assert_eq!(DeleteStrategy::FileId.key(&result), Some("f1"));
    }

    #[test]
    fn test_absent_fields_yield_no_key() {
        let result = make_result(None, None);
        for strategy in DELETE_STRATEGIES {
            assert_eq!(strategy.key(&result), None);
        }
    }
}

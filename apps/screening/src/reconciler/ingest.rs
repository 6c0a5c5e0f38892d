//! Ingestion boundary: raw backend rows in, display-ready results out.
//!
//! All three historical storage shapes of the keyword fields are collapsed
//! here into plain `Vec<String>`; nothing past this module ever sees a
//! [`KeywordField`]. Malformed data degrades to empty and is logged, never
//! surfaced.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::models::{AnalysisResult, FileRecord, KeywordField, RawAnalysisRecord, UNKNOWN_FILENAME};

/// Normalizes one stored keyword field into a flat list of strings.
pub fn normalize_keywords(field: &KeywordField) -> Vec<String> {
    match field {
        KeywordField::Text(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => collect_strings(items.iter()),
            Ok(other) => {
                warn!("Keyword text decoded to a non-array shape, discarding: {other}");
                Vec::new()
            }
            Err(err) => {
                warn!("Discarding unparseable keyword text: {err}");
                Vec::new()
            }
        },
        KeywordField::Seq(items) => collect_strings(items.iter()),
        KeywordField::Map(map) => collect_strings(map.values()),
        KeywordField::Other(value) => {
            if !value.is_null() {
                warn!("Discarding keyword field with unexpected shape: {value}");
            }
            Vec::new()
        }
    }
}

fn collect_strings<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<String> {
    values
        .filter_map(|value| match value {
            Value::String(s) => Some(s.clone()),
            other => {
                warn!("Skipping non-string keyword entry: {other}");
                None
            }
        })
        .collect()
}

/// Joins analysis records against the folder's file records.
/// Records whose file id matches nothing keep the sentinel filename.
pub fn assemble_results(
    folder_id: &str,
    files: &[FileRecord],
    records: Vec<RawAnalysisRecord>,
) -> Vec<AnalysisResult> {
    let names: HashMap<&str, &str> = files
        .iter()
        .map(|file| (file.id.as_str(), file.name.as_str()))
        .collect();

    records
        .into_iter()
        .map(|record| {
            let filename = names
                .get(record.file_id.as_str())
                .map(|name| (*name).to_string())
                .unwrap_or_else(|| UNKNOWN_FILENAME.to_string());
            into_result(record, folder_id, filename)
        })
        .collect()
}

/// Assembles a single result for the detail view, where the file record is
/// already in hand.
pub fn assemble_one(file: &FileRecord, record: RawAnalysisRecord) -> AnalysisResult {
    let filename = file.name.clone();
    into_result(record, &file.folder_id, filename)
}

fn into_result(record: RawAnalysisRecord, folder_id: &str, filename: String) -> AnalysisResult {
    let RawAnalysisRecord {
        id,
        file_id,
        match_score,
        strengths,
        weaknesses,
        created_at,
    } = record;

    AnalysisResult {
        id: Some(id),
        file_id: Some(file_id),
        folder_id: folder_id.to_string(),
        filename,
        score: match_score,
        matched_keywords: normalize_keywords(&strengths),
        missing_keywords: normalize_keywords(&weaknesses),
        recommendations: Vec::new(),
        analyzed_at: created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn make_file(id: &str, name: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            name: name.to_string(),
            folder_id: "F1".to_string(),
        }
    }

    fn make_record(id: &str, file_id: &str, strengths: KeywordField) -> RawAnalysisRecord {
        RawAnalysisRecord {
            id: id.to_string(),
            file_id: file_id.to_string(),
            match_score: 50.0,
            strengths,
            weaknesses: KeywordField::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_decodes_encoded_text() {
        let field = KeywordField::Text("[\"rust\",\"sql\"]".to_string());
        assert_eq!(normalize_keywords(&field), vec!["rust", "sql"]);
    }

    #[test]
    fn test_normalize_keeps_sequence_as_is() {
        let field = KeywordField::Seq(vec![json!("rust"), json!("sql")]);
        assert_eq!(normalize_keywords(&field), vec!["rust", "sql"]);
    }

    #[test]
    fn test_normalize_takes_map_values_in_enumeration_order() {
        let field: KeywordField =
            serde_json::from_value(json!({"0": "rust", "1": "sql", "2": "grpc"})).unwrap();
        assert_eq!(normalize_keywords(&field), vec!["rust", "sql", "grpc"]);
    }

    #[test]
    fn test_normalize_degrades_malformed_text_to_empty() {
        let field = KeywordField::Text("not [ json".to_string());
        assert!(normalize_keywords(&field).is_empty());
    }

    #[test]
    fn test_normalize_degrades_scalar_to_empty() {
        let field = KeywordField::Other(json!(42));
        assert!(normalize_keywords(&field).is_empty());
    }

    #[test]
    fn test_normalize_skips_non_string_sequence_entries() {
        let field = KeywordField::Seq(vec![json!("rust"), json!(7), json!("sql")]);
        assert_eq!(normalize_keywords(&field), vec!["rust", "sql"]);
    }

    #[test]
    fn test_assemble_joins_filename_by_file_id() {
        let files = vec![make_file("f1", "a.pdf"), make_file("f2", "b.pdf")];
        let records = vec![make_record("r1", "f2", KeywordField::default())];

        let results = assemble_results("F1", &files, records);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].filename, "b.pdf");
        assert_eq!(results[0].folder_id, "F1");
        assert_eq!(results[0].file_id.as_deref(), Some("f2"));
    }

    #[test]
    fn test_assemble_defaults_missing_file_to_sentinel() {
        let files = vec![make_file("f1", "a.pdf")];
        let records = vec![make_record("r1", "gone", KeywordField::default())];

        let results = assemble_results("F1", &files, records);
        assert_eq!(results[0].filename, UNKNOWN_FILENAME);
    }

    #[test]
    fn test_assemble_leaves_recommendations_empty() {
        let files = vec![make_file("f1", "a.pdf")];
        let records = vec![make_record("r1", "f1", KeywordField::default())];

        let results = assemble_results("F1", &files, records);
        assert!(results[0].recommendations.is_empty());
    }
}

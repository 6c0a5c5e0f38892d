//! Pure filter/sort over loaded results.
//!
//! Non-destructive: the reconciler keeps the load-ordered list and derives
//! the visible slice per render, so clearing a search term restores the
//! original set untouched.

use std::cmp::Ordering;

use crate::models::AnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Score,
    Filename,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::Score,
            order: SortOrder::Descending,
        }
    }
}

impl SortState {
    /// Re-selecting the active key flips the order; a new key resets to
    /// descending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.order = match self.order {
                SortOrder::Ascending => SortOrder::Descending,
                SortOrder::Descending => SortOrder::Ascending,
            };
        } else {
            self.key = key;
            self.order = SortOrder::Descending;
        }
    }
}

/// Filters by case-insensitive substring on filename, then sorts.
pub fn visible_results(
    results: &[AnalysisResult],
    search_term: &str,
    sort: SortState,
) -> Vec<AnalysisResult> {
    let needle = search_term.to_lowercase();
    let mut visible: Vec<AnalysisResult> = results
        .iter()
        .filter(|result| result.filename.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    visible.sort_by(|a, b| compare(a, b, sort));
    visible
}

fn compare(a: &AnalysisResult, b: &AnalysisResult, sort: SortState) -> Ordering {
    let ordering = match sort.key {
        SortKey::Score => a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal),
        SortKey::Filename => compare_filenames(&a.filename, &b.filename),
    };
    match sort.order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}

/// Case-insensitive comparison; the raw strings break ties so names equal
/// ignoring case still order deterministically.
fn compare_filenames(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

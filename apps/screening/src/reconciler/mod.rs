//! The Result Reconciler.
//!
//! Joins a folder's file records with their analysis records, serves the
//! listing view a sortable, searchable result set, and reconciles
//! deletions against the two remote key spaces. Every remote failure is
//! caught here and degraded to empty local state; only delete failures
//! ever surface, through the presentation collaborator.

pub mod delete;
pub mod ingest;
pub mod view;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::auth::{AuthProvider, PLACEHOLDER_USER};
use crate::cache::HintCache;
use crate::errors::AppError;
use crate::models::AnalysisResult;
use crate::store::AnalysisStore;
use crate::ui::{encode_route_segment, DialogState, Navigator, Presenter, Route};

use self::delete::{DeleteStrategy, DELETE_STRATEGIES};
pub use self::view::{SortKey, SortOrder, SortState};

/// Settle delay before routing away after the last result is deleted.
const REDIRECT_SETTLE: Duration = Duration::from_millis(500);

/// External collaborators the reconciler drives.
pub struct Collaborators {
    pub store: Arc<dyn AnalysisStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub cache: Arc<dyn HintCache>,
    pub navigator: Arc<dyn Navigator>,
    pub presenter: Arc<dyn Presenter>,
}

/// Outcome of a load pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Results are in place (possibly an empty set).
    Loaded,
    /// No folder context was available; the navigator was routed to the
    /// parent listing.
    Redirected,
}

/// UI flags mirrored to the shell. Cleared unconditionally when a delete
/// finishes, whatever the outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteFlags {
    pub confirm_pending: bool,
    pub deleting: bool,
}

/// The keys a successful remote delete actually removed. Local removal
/// matches on these, never on keys the remote still holds rows for.
struct DeletedKeys {
    id: Option<String>,
    file_id: Option<String>,
}

pub struct Reconciler {
    store: Arc<dyn AnalysisStore>,
    auth: Arc<dyn AuthProvider>,
    cache: Arc<dyn HintCache>,
    navigator: Arc<dyn Navigator>,
    presenter: Arc<dyn Presenter>,

    folder_id: Option<String>,
    folder_name: String,
    results: Vec<AnalysisResult>,
    search_term: String,
    sort: SortState,
    flags: DeleteFlags,
    pending_delete: Option<AnalysisResult>,
}

impl Reconciler {
    pub fn new(collaborators: Collaborators) -> Self {
        let Collaborators {
            store,
            auth,
            cache,
            navigator,
            presenter,
        } = collaborators;
        Self {
            store,
            auth,
            cache,
            navigator,
            presenter,
            folder_id: None,
            folder_name: String::new(),
            results: Vec::new(),
            search_term: String::new(),
            sort: SortState::default(),
            flags: DeleteFlags::default(),
            pending_delete: None,
        }
    }

    /// Rebuilds the result set for one folder.
    ///
    /// `folder_ctx` is the folder id handed over by the calling view; the
    /// persisted last-used folder only recovers direct navigation without
    /// context. The fetches run sequentially; each failure degrades to an
    /// empty set rather than an error.
    pub async fn load(&mut self, folder_ctx: Option<&str>) -> LoadOutcome {
        let folder_id = folder_ctx
            .map(str::to_string)
            .or_else(|| self.cache.last_folder());
        let Some(folder_id) = folder_id else {
            info!("No folder context available, routing back to the listing");
            self.results.clear();
            self.navigator.go(Route::Listing { folder_id: None });
            return LoadOutcome::Redirected;
        };

        self.cache.set_last_folder(&folder_id);
        self.folder_id = Some(folder_id.clone());

        // Cosmetic only; a failed name lookup never blocks the load.
        self.folder_name = match self.store.folder_name(&folder_id).await {
            Ok(name) => name.unwrap_or_default(),
            Err(err) => {
                warn!("Folder name lookup failed for {folder_id}: {err}");
                String::new()
            }
        };

        let files = match self.store.files_in_folder(&folder_id).await {
            Ok(files) => files,
            Err(err) => {
                warn!("File list fetch failed for {folder_id}: {err}");
                self.results.clear();
                return LoadOutcome::Loaded;
            }
        };
        if files.is_empty() {
            debug!("Folder {folder_id} has no files");
            self.results.clear();
            self.cache.replace_analyzed_files(&folder_id, &[]);
            return LoadOutcome::Loaded;
        }

        let file_ids: Vec<String> = files.iter().map(|file| file.id.clone()).collect();
        let records = match self.store.analyses_for_files(&file_ids).await {
            Ok(records) => records,
            Err(err) => {
                warn!("Analysis fetch failed for {folder_id}: {err}");
                self.results.clear();
                return LoadOutcome::Loaded;
            }
        };

        self.results = ingest::assemble_results(&folder_id, &files, records);

        let analyzed: Vec<String> = self
            .results
            .iter()
            .filter_map(|result| result.file_id.clone())
            .collect();
        self.cache.replace_analyzed_files(&folder_id, &analyzed);

        info!(
            "Loaded {} analysis result(s) for folder {folder_id}",
            self.results.len()
        );
        LoadOutcome::Loaded
    }

    // ── View state ──────────────────────────────────────────────────────

    /// The filtered, sorted slice the listing renders. The load-ordered
    /// set underneath is never mutated by filtering.
    pub fn visible_results(&self) -> Vec<AnalysisResult> {
        view::visible_results(&self.results, &self.search_term, self.sort)
    }

    pub fn results(&self) -> &[AnalysisResult] {
        &self.results
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    pub fn flags(&self) -> DeleteFlags {
        self.flags
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort.toggle(key);
    }

    // ── Navigation ──────────────────────────────────────────────────────

    /// Routes to the detail view for one result.
    pub fn open_detail(&self, result: &AnalysisResult) {
        self.navigator.go(Route::Detail {
            encoded_filename: encode_route_segment(&result.filename),
        });
    }

    /// Routes back to the parent file listing.
    pub fn return_to_files(&self) {
        self.navigator.go(Route::Listing {
            folder_id: self.folder_id.clone(),
        });
    }

    /// Routes one step back in history.
    pub fn go_back(&self) {
        self.navigator.go(Route::Back);
    }

    // ── Delete flow ─────────────────────────────────────────────────────

    /// Marks `result` for deletion and opens the confirmation dialog.
    pub fn request_delete(&mut self, result: AnalysisResult) {
        self.flags.confirm_pending = true;
        self.presenter
            .render_dialog(DialogState::confirm_delete(&result.filename, false));
        self.pending_delete = Some(result);
    }

    /// The presenter's cancel signal.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.flags = DeleteFlags::default();
        self.presenter.render_dialog(DialogState::closed());
    }

    /// The presenter's confirm signal. Runs the two-key delete sequence;
    /// the UI flags and dialog are reset on every path out of here.
    pub async fn confirm_delete(&mut self) {
        let Some(target) = self.pending_delete.take() else {
            self.flags = DeleteFlags::default();
            self.presenter.render_dialog(DialogState::closed());
            return;
        };

        self.flags.deleting = true;
        self.presenter
            .render_dialog(DialogState::confirm_delete(&target.filename, true));

        let outcome = self.delete_remote(&target).await;

        let remaining = match &outcome {
            Ok(keys) => Some(self.apply_deletion(&target, keys)),
            Err(_) => None,
        };

        // Terminal state, success or failure alike.
        self.flags = DeleteFlags::default();
        self.presenter.render_dialog(DialogState::closed());

        match outcome {
            Ok(_) => {
                // Remaining count is recomputed after the removal, not
                // taken from the pre-delete length.
                if remaining == Some(0) {
                    tokio::time::sleep(REDIRECT_SETTLE).await;
                    self.navigator.go(Route::Listing {
                        folder_id: self.folder_id.clone(),
                    });
                }
            }
            Err(AppError::MissingDeleteKey) => {
                warn!("Delete rejected: result carries no identifying key");
                self.presenter
                    .alert("This result has no identifying key and cannot be deleted.");
            }
            Err(err) => {
                warn!("Delete failed for {}: {err}", target.filename);
                self.presenter.alert(&format!(
                    "Could not delete the analysis for {}.",
                    target.filename
                ));
            }
        }
    }

    /// Tries each deletion strategy in order until one reports success.
    /// No retries, no backoff; two attempts at most.
    async fn delete_remote(&self, target: &AnalysisResult) -> Result<DeletedKeys, AppError> {
        let user = self.acting_user().await;

        if target.id.is_none() && target.file_id.is_none() {
            return Err(AppError::MissingDeleteKey);
        }

        for strategy in DELETE_STRATEGIES {
            let Some(key) = strategy.key(target) else {
                continue;
            };
            debug!(user = %user, "Attempting delete by {} = {key}", strategy.label());
            match strategy.attempt(self.store.as_ref(), key).await {
                Ok(true) => {
                    info!("Deleted analysis by {} = {key}", strategy.label());
                    return Ok(match strategy {
                        // Only the one record behind this id is gone.
                        DeleteStrategy::AnalysisId => DeletedKeys {
                            id: Some(key.to_string()),
                            file_id: None,
                        },
                        // Every record for the file is gone, including the
                        // target's own.
                        DeleteStrategy::FileId => DeletedKeys {
                            id: target.id.clone(),
                            file_id: Some(key.to_string()),
                        },
                    });
                }
                Ok(false) => debug!("Delete by {} matched nothing", strategy.label()),
                Err(err) => warn!("Delete by {} failed: {err}", strategy.label()),
            }
        }

        Err(AppError::DeleteExhausted)
    }

    /// Removes locally what the remote delete removed, drops the file's
    /// hint, and returns how many results remain.
    fn apply_deletion(&mut self, target: &AnalysisResult, keys: &DeletedKeys) -> usize {
        self.results.retain(|entry| !matches_deleted(entry, keys));

        if let (Some(folder_id), Some(file_id)) = (&self.folder_id, &target.file_id) {
            self.cache.remove_analyzed_file(folder_id, file_id);
        }

        self.results.len()
    }

    // ── Supplemental lookups ────────────────────────────────────────────

    /// Resolves the analysis shown on the detail view by exact filename:
    /// file record first, then that file's most recent analysis.
    pub async fn detail_for_filename(&self, filename: &str) -> Option<AnalysisResult> {
        let user = self.acting_user().await;

        let file = match self.store.file_by_name(filename).await {
            Ok(Some(file)) => file,
            Ok(None) => {
                debug!("No file record named {filename}");
                return None;
            }
            Err(err) => {
                warn!("File lookup failed for {filename}: {err}");
                return None;
            }
        };

        match self.store.latest_analysis_for_file(&file.id, &user).await {
            Ok(Some(record)) => Some(ingest::assemble_one(&file, record)),
            Ok(None) => None,
            Err(err) => {
                warn!("Analysis lookup failed for file {}: {err}", file.id);
                None
            }
        }
    }

    /// Whether any file in `folder_id` has at least one analysis record.
    /// Backs the listing's per-folder badge; failures degrade to `false`.
    pub async fn folder_has_results(&self, folder_id: &str) -> bool {
        let files = match self.store.files_in_folder(folder_id).await {
            Ok(files) => files,
            Err(err) => {
                warn!("File list fetch failed for {folder_id}: {err}");
                return false;
            }
        };
        if files.is_empty() {
            return false;
        }

        let file_ids: Vec<String> = files.into_iter().map(|file| file.id).collect();
        match self.store.analyses_for_files(&file_ids).await {
            Ok(records) => !records.is_empty(),
            Err(err) => {
                warn!("Analysis fetch failed for {folder_id}: {err}");
                false
            }
        }
    }

    /// Advisory hint for sibling views: file ids last known to have
    /// analysis results in this folder.
    pub fn analyzed_file_hints(&self, folder_id: &str) -> Vec<String> {
        self.cache.analyzed_files(folder_id)
    }

    async fn acting_user(&self) -> String {
        match self.auth.current_user().await {
            Ok(Some(id)) => id,
            Ok(None) => PLACEHOLDER_USER.to_string(),
            Err(err) => {
                warn!("Auth lookup failed, acting as {PLACEHOLDER_USER}: {err}");
                PLACEHOLDER_USER.to_string()
            }
        }
    }
}

fn matches_deleted(entry: &AnalysisResult, keys: &DeletedKeys) -> bool {
    let id_match = match (&entry.id, &keys.id) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    let file_match = match (&entry.file_id, &keys.file_id) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    id_match || file_match
}

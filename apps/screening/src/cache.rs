//! Local hint cache.
//!
//! Two kinds of hints survive navigation: the last-used folder id (one
//! global key) and, per folder, the file ids known to have analysis
//! results as of the last load or delete. Both are advisory; the remote
//! store stays authoritative, and every failure here is swallowed and
//! logged.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The persisted hint store. Writes replace a key's value wholesale;
/// there is no partial merge.
pub trait HintCache: Send + Sync {
    fn last_folder(&self) -> Option<String>;
    fn set_last_folder(&self, folder_id: &str);

    /// File ids last known to have analysis results in this folder.
    fn analyzed_files(&self, folder_id: &str) -> Vec<String>;
    /// Replaces the folder's hint set after an authoritative load.
    fn replace_analyzed_files(&self, folder_id: &str, file_ids: &[String]);
    /// Drops one file id after a successful delete.
    fn remove_analyzed_file(&self, folder_id: &str, file_id: &str);
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HintDocument {
    last_folder: Option<String>,
    #[serde(default)]
    analyzed_files: HashMap<String, Vec<String>>,
}

/// Hint cache persisted as a single JSON document.
///
/// The whole document is rewritten on every mutation, mirroring the
/// wholesale-replace contract of the individual keys.
pub struct FileHintCache {
    path: PathBuf,
    doc: Mutex<HintDocument>,
}

impl FileHintCache {
    /// Opens the cache at `path`. A missing or unparseable document
    /// starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = read_document(&path);
        Self {
            path,
            doc: Mutex::new(doc),
        }
    }

    fn persist(&self, doc: &HintDocument) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!("Could not create hint cache dir {parent:?}: {err}");
                return;
            }
        }
        let json = match serde_json::to_string_pretty(doc) {
            Ok(json) => json,
            Err(err) => {
                warn!("Could not serialize hint cache: {err}");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, json) {
            warn!("Could not write hint cache {:?}: {err}", self.path);
        }
    }
}

fn read_document(path: &Path) -> HintDocument {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!("Discarding unparseable hint cache {path:?}: {err}");
            HintDocument::default()
        }),
        Err(_) => HintDocument::default(),
    }
}

impl HintCache for FileHintCache {
    fn last_folder(&self) -> Option<String> {
        self.doc.lock().unwrap().last_folder.clone()
    }

    fn set_last_folder(&self, folder_id: &str) {
        let mut doc = self.doc.lock().unwrap();
        doc.last_folder = Some(folder_id.to_string());
        self.persist(&doc);
    }

    fn analyzed_files(&self, folder_id: &str) -> Vec<String> {
        self.doc
            .lock()
            .unwrap()
            .analyzed_files
            .get(folder_id)
            .cloned()
            .unwrap_or_default()
    }

    fn replace_analyzed_files(&self, folder_id: &str, file_ids: &[String]) {
        let mut doc = self.doc.lock().unwrap();
        doc.analyzed_files
            .insert(folder_id.to_string(), file_ids.to_vec());
        self.persist(&doc);
    }

    fn remove_analyzed_file(&self, folder_id: &str, file_id: &str) {
        let mut doc = self.doc.lock().unwrap();
        if let Some(ids) = doc.analyzed_files.get_mut(folder_id) {
            ids.retain(|id| id != file_id);
        }
        self.persist(&doc);
    }
}

/// In-memory hint cache for shells without disk access, and for tests.
#[derive(Default)]
pub struct MemoryHintCache {
    doc: Mutex<HintDocument>,
}

impl MemoryHintCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HintCache for MemoryHintCache {
    fn last_folder(&self) -> Option<String> {
        self.doc.lock().unwrap().last_folder.clone()
    }

    fn set_last_folder(&self, folder_id: &str) {
        self.doc.lock().unwrap().last_folder = Some(folder_id.to_string());
    }

    fn analyzed_files(&self, folder_id: &str) -> Vec<String> {
        self.doc
            .lock()
            .unwrap()
            .analyzed_files
            .get(folder_id)
            .cloned()
            .unwrap_or_default()
    }

    fn replace_analyzed_files(&self, folder_id: &str, file_ids: &[String]) {
        self.doc
            .lock()
            .unwrap()
            .analyzed_files
            .insert(folder_id.to_string(), file_ids.to_vec());
    }

    fn remove_analyzed_file(&self, folder_id: &str, file_id: &str) {
        if let Some(ids) = self
            .doc
            .lock()
            .unwrap()
            .analyzed_files
            .get_mut(folder_id)
        {
            ids.retain(|id| id != file_id);
        }
    }
}

pub mod analysis;

pub use analysis::{
    AnalysisResult, FileRecord, FolderRecord, KeywordField, RawAnalysisRecord, UNKNOWN_FILENAME,
};

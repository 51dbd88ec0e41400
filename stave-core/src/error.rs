//! Error type for operations that can fail hard: storage, encoding, and
//! corrupted history. Data-shape mismatches inside diff/merge never surface
//! here; they degrade to defaults instead.

/// Error type for history persistence and structural validation.
#[derive(Debug)]
pub enum VcsError {
    /// A referenced revision, stash, or tracked item does not exist.
    NotFound(String),
    /// The stored revision graph is not a rooted tree. Unrecoverable.
    HistoryCorrupted(String),
    Storage(rusqlite::Error),
    Encoding(String),
    Json(serde_json::Error),
    Io(std::io::Error),
}

pub type VcsResult<T> = Result<T, VcsError>;

impl From<rusqlite::Error> for VcsError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e)
    }
}

impl From<serde_json::Error> for VcsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<std::io::Error> for VcsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<rmp_serde::encode::Error> for VcsError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Self::Encoding(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for VcsError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Self::Encoding(e.to_string())
    }
}

impl std::fmt::Display for VcsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "not found: {}", what),
            Self::HistoryCorrupted(why) => write!(f, "history corrupted: {}", why),
            Self::Storage(e) => write!(f, "storage error: {}", e),
            Self::Encoding(e) => write!(f, "encoding error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for VcsError {}

impl VcsError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::HistoryCorrupted(_))
    }
}

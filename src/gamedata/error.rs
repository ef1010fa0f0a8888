//! Error definitions for loading and resolving game data

use std::path::PathBuf;
use thiserror::Error;

/// Hard failures while loading the gamedata document
///
/// Problems with individual entries never surface here; they are skipped and
/// counted in the [`BuildReport`](super::BuildReport).
#[derive(Debug, Error)]
pub enum GameDataError {
    #[error("Failed to read gamedata file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Gamedata is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Gamedata root must be a JSON object")]
    NotAnObject,

    #[error("Gamedata schema version {0} is newer than this tool supports")]
    UnsupportedVersion(u64),

    #[error("Versioned gamedata document has no \"games\" object")]
    MissingGames,
}

/// Why a ROM has no controls to show
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Unknown ROM: {0}")]
    UnknownRom(String),

    #[error("No control data for {0}")]
    NoControls(String),
}

impl ResolveError {
    /// Both variants mean "nothing to display"; neither is fatal
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::UnknownRom(_) | ResolveError::NoControls(_))
    }

    pub fn rom_id(&self) -> &str {
        match self {
            ResolveError::UnknownRom(id) | ResolveError::NoControls(id) => id,
        }
    }
}

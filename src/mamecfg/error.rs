use std::path::PathBuf;
use thiserror::Error;

/// Failures reading a MAME `.cfg` document
#[derive(Debug, Error)]
pub enum CfgError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed cfg XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

impl CfgError {
    pub fn is_missing_file(&self) -> bool {
        matches!(self, CfgError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

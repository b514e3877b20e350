use std::path::PathBuf;

/// Errors produced while syncing the merged dictionary.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Config file absent or has no `repositories` list
    #[error("no repositories configured in {path}")]
    ConfigurationMissing { path: PathBuf },

    #[error("invalid config {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("empty content from {url}")]
    EmptyContent { url: String },

    #[error("no commit time available for {repo}/{path}")]
    TimestampUnavailable { repo: String, path: String },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

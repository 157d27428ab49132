//! Error types for mirror-core

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configured root overlaps another root or leaves the workspace.
    ///
    /// Always raised before any filesystem mutation.
    #[error("Invalid configuration for `{path}`: {reason}")]
    Configuration { path: String, reason: String },

    /// Two distinct sources map to the same output path
    #[error("Output path collision at {output}: `{first}` and `{second}` both map to it")]
    Collision {
        output: String,
        first: String,
        second: String,
    },

    /// A computed path resolves outside the root it must stay in
    #[error("Path `{path}` resolves outside `{root}`")]
    PathEscape { path: String, root: String },

    /// A source document is not valid UTF-8 and the markdown mode is strict
    #[error("Source `{path}` is not valid UTF-8 (use markdown mode `lossy` to decode it anyway)")]
    Encoding { path: String },

    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn configuration(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn escape(path: impl ToString, root: impl ToString) -> Self {
        Self::PathEscape {
            path: path.to_string(),
            root: root.to_string(),
        }
    }
}

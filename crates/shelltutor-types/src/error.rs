//! Error types for shelltutor.

/// Errors produced by the simulated terminal session.
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    /// `cd` target does not resolve to an existing directory. Carries the
    /// argument exactly as the user typed it.
    #[error("cd: {0}: No such file or directory")]
    NoSuchDirectory(String),

    #[error("no such path: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("{0}")]
    Usage(String),

    /// Re-creating the response engine session after a navigation failed.
    #[error("context sync failed: {0}")]
    ContextSync(String),

    /// The response engine call errored or was rejected.
    #[error("response engine error: {0}")]
    Remote(String),

    /// Missing credentials or a collaborator that could not be built.
    #[error("initialization failed: {0}")]
    Init(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TutorError {
    /// Whether the session can keep accepting input after this error.
    ///
    /// Only initialization failures are fatal; everything else is reported
    /// and the session returns to idle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Init(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TutorError>;

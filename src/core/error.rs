use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the installer and launch pipeline.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("hash not same\ngot: {actual}\nneed: {expected}")]
    HashMismatch { expected: String, actual: String },

    // ── Document shape ──────────────────────────────────
    #[error("expected an array at `{path}`")]
    NotArray { path: String },

    #[error("expected an object at `{path}`")]
    NotObject { path: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path escapes the install root: {0}")]
    UnsafePath(String),

    // ── Resolution ──────────────────────────────────────
    #[error("id \"{0}\" is not found")]
    VersionNotFound(String),

    #[error("Unknown download source: {0}")]
    InvalidSource(String),

    // ── Authentication ──────────────────────────────────
    #[error("No profile named {0} on this account")]
    NoMatchingProfile(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    // ── Java ────────────────────────────────────────────
    #[error("Java not configured for major version {0}")]
    MissingJavaVersion(u32),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

/// Attach a path to IO failures without spelling out the struct literal.
pub trait IoContext<T> {
    fn at_path(self, path: impl Into<PathBuf>) -> LauncherResult<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at_path(self, path: impl Into<PathBuf>) -> LauncherResult<T> {
        self.map_err(|source| LauncherError::Io {
            path: path.into(),
            source,
        })
    }
}

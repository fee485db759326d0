/// Unified error types for the scaffold fetcher.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::FetchReport;

/// Coarse classification of a [`FetchError`], recorded in failed outcomes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Timeout,
    HttpStatus,
    Filesystem,
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::HttpStatus => write!(f, "http_status"),
            ErrorKind::Filesystem => write!(f, "filesystem"),
            ErrorKind::Config => write!(f, "config"),
        }
    }
}

/// Top-level error type for a scaffold fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error fetching {path} from {url}: {message}")]
    Network {
        path: String,
        url: String,
        message: String,
    },

    #[error("Timed out fetching {path} from {url}")]
    Timeout { path: String, url: String },

    #[error("HTTP {status} fetching {path} from {url}")]
    HttpStatus {
        path: String,
        url: String,
        status: u16,
    },

    #[error("Cannot write {}: {source}", .target.display())]
    Filesystem {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Network { .. } => ErrorKind::Network,
            FetchError::Timeout { .. } => ErrorKind::Timeout,
            FetchError::HttpStatus { .. } => ErrorKind::HttpStatus,
            FetchError::Filesystem { .. } => ErrorKind::Filesystem,
            FetchError::Config(_) => ErrorKind::Config,
        }
    }

    /// Relative scaffold path the error is about, if it concerns a single file.
    pub fn path(&self) -> Option<&str> {
        match self {
            FetchError::Network { path, .. }
            | FetchError::Timeout { path, .. }
            | FetchError::HttpStatus { path, .. } => Some(path),
            FetchError::Filesystem { .. } | FetchError::Config(_) => None,
        }
    }
}

/// Failure reported by a transport before the fetcher attaches file context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),
}

impl TransportError {
    /// Attach the scaffold path and resolved URL to a transport failure.
    pub fn into_fetch_error(self, path: &str, url: &str) -> FetchError {
        match self {
            TransportError::Timeout => FetchError::Timeout {
                path: path.to_string(),
                url: url.to_string(),
            },
            TransportError::Network(message) => FetchError::Network {
                path: path.to_string(),
                url: url.to_string(),
                message,
            },
            TransportError::Status(status) => FetchError::HttpStatus {
                path: path.to_string(),
                url: url.to_string(),
                status,
            },
        }
    }
}

/// A run that stopped early. Files written before the failure stay on disk
/// and are listed in `report`.
#[derive(Debug, Error)]
#[error("Scaffold fetch aborted after {} file(s): {error}", .report.succeeded())]
pub struct FetchFailure {
    pub error: FetchError,
    pub report: FetchReport,
}

impl FetchFailure {
    pub fn new(error: FetchError, report: FetchReport) -> Self {
        Self { error, report }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Errors raised while resolving the host's project configuration.
#[derive(Debug, Error)]
pub enum HostConfigError {
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Vendor directory {} has no parent directory", .0.display())]
    NoProjectRoot(PathBuf),

    #[error("Working directory unavailable: {0}")]
    WorkingDir(#[source] std::io::Error),
}

impl From<HostConfigError> for FetchError {
    fn from(err: HostConfigError) -> Self {
        FetchError::Config(err.to_string())
    }
}

/// Unknown lifecycle event name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown lifecycle event: {0}")]
pub struct UnknownEventError(pub String);

/// Result type alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_gains_file_context() {
        let err = TransportError::Status(404).into_fetch_error("dsh", "https://example.test/master/dsh");
        assert_eq!(err.kind(), ErrorKind::HttpStatus);
        assert_eq!(err.path(), Some("dsh"));
        assert_eq!(
            err.to_string(),
            "HTTP 404 fetching dsh from https://example.test/master/dsh"
        );
    }

    #[test]
    fn test_timeout_is_distinct_from_network() {
        let timeout = TransportError::Timeout.into_fetch_error("a", "u");
        let network = TransportError::Network("connection refused".into()).into_fetch_error("a", "u");
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(network.kind(), ErrorKind::Network);
        assert!(network.to_string().contains("connection refused"));
    }

    #[test]
    fn test_filesystem_error_names_target() {
        let err = FetchError::Filesystem {
            target: PathBuf::from("/srv/site/dsh"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(err.kind(), ErrorKind::Filesystem);
        assert!(err.to_string().contains("/srv/site/dsh"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_host_config_error_becomes_config() {
        let err: FetchError = HostConfigError::NoProjectRoot(PathBuf::from("/")).into();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}

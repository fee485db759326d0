/// Scaffold request and fetch report models shared across crates.
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorKind, FetchError};

/// Raw-file source for the Site Manager scaffold repository.
pub const SITE_MANAGER_SOURCE: &str =
    "https://raw.githubusercontent.com/universityofadelaide/sm-scaffold/{version}/{path}";

/// Branch fetched when no version is given.
pub const DEFAULT_VERSION: &str = "master";

/// Files copied into the project root, in fetch order.
pub const SITE_MANAGER_FILES: [&str; 3] = [
    "RoboFileBase.php",
    "RoboFileDrupalDeploymentInterface.php",
    "dsh",
];

/// One scaffold run: where to fetch from and where to write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScaffoldRequest {
    /// URL containing `{version}` and `{path}` placeholders.
    pub url_template: String,
    pub version: String,
    /// Relative paths; list order is fetch order.
    pub file_list: Vec<String>,
    pub destination_dir: PathBuf,
}

impl ScaffoldRequest {
    pub fn new(url_template: impl Into<String>, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            url_template: url_template.into(),
            version: DEFAULT_VERSION.to_string(),
            file_list: Vec::new(),
            destination_dir: destination_dir.into(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_list = files.into_iter().map(Into::into).collect();
        self
    }

    /// The Site Manager scaffold at `master`, written into `destination_dir`.
    pub fn site_manager(destination_dir: impl Into<PathBuf>) -> Self {
        Self::new(SITE_MANAGER_SOURCE, destination_dir).with_files(SITE_MANAGER_FILES)
    }

    /// Where `path` lands on disk.
    pub fn target_path(&self, path: &str) -> PathBuf {
        self.destination_dir.join(Path::new(path))
    }
}

/// Result of attempting a single file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Written {
        path: String,
        bytes: u64,
    },
    Failed {
        path: String,
        kind: ErrorKind,
        message: String,
    },
}

impl FetchOutcome {
    pub fn written(path: impl Into<String>, bytes: u64) -> Self {
        FetchOutcome::Written {
            path: path.into(),
            bytes,
        }
    }

    pub fn failed(path: impl Into<String>, error: &FetchError) -> Self {
        FetchOutcome::Failed {
            path: path.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            FetchOutcome::Written { path, .. } | FetchOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Written { .. })
    }
}

/// Outcomes of a run in attempt order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchReport {
    pub outcomes: Vec<FetchOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl FetchReport {
    /// Start an empty report stamped with the current time.
    pub fn begin() -> Self {
        Self {
            outcomes: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, outcome: FetchOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn bytes_written(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o {
                FetchOutcome::Written { bytes, .. } => *bytes,
                FetchOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    /// Whether every attempted file was written.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(FetchOutcome::is_success)
    }

    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}

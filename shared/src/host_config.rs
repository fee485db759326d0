/// Host project configuration, resolved the way Composer resolves it.
///
/// Only the vendor directory matters here: the scaffold is written to its
/// parent, which is the project root.
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::errors::HostConfigError;

/// Env var naming an alternative manifest file.
pub const COMPOSER_ENV: &str = "COMPOSER";
/// Env var overriding `config.vendor-dir`.
pub const VENDOR_DIR_ENV: &str = "COMPOSER_VENDOR_DIR";

pub const DEFAULT_COMPOSER_FILE: &str = "composer.json";
pub const DEFAULT_VENDOR_DIR: &str = "vendor";

#[derive(Debug, Default, Deserialize)]
struct ComposerManifest {
    #[serde(default)]
    config: ComposerConfigSection,
}

#[derive(Debug, Default, Deserialize)]
struct ComposerConfigSection {
    #[serde(rename = "vendor-dir")]
    vendor_dir: Option<String>,
}

/// Environment overrides consulted during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub composer_file: Option<String>,
    pub vendor_dir: Option<String>,
}

impl EnvOverrides {
    /// Read overrides from the process environment. Empty values are ignored.
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            composer_file: non_empty(COMPOSER_ENV),
            vendor_dir: non_empty(VENDOR_DIR_ENV),
        }
    }
}

/// Resolved host configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    working_dir: PathBuf,
    composer_file: PathBuf,
    vendor_dir: PathBuf,
}

impl HostConfig {
    /// Resolve configuration for `working_dir` using the process environment.
    pub fn load(working_dir: impl AsRef<Path>) -> Result<Self, HostConfigError> {
        Self::load_with(working_dir, &EnvOverrides::from_env())
    }

    /// Resolve configuration with explicit overrides.
    ///
    /// Precedence for the vendor dir: override, then `config.vendor-dir` in
    /// the manifest, then `vendor`. A missing manifest is not an error.
    pub fn load_with(
        working_dir: impl AsRef<Path>,
        overrides: &EnvOverrides,
    ) -> Result<Self, HostConfigError> {
        let working_dir = absolute(working_dir.as_ref())?;
        let composer_file = working_dir.join(
            overrides
                .composer_file
                .as_deref()
                .unwrap_or(DEFAULT_COMPOSER_FILE),
        );

        let manifest = read_manifest(&composer_file)?;
        let vendor_dir = overrides
            .vendor_dir
            .clone()
            .or(manifest.config.vendor_dir)
            .unwrap_or_else(|| DEFAULT_VENDOR_DIR.to_string());
        let vendor_dir = working_dir.join(vendor_dir.trim_end_matches(['/', '\\']));

        debug!(
            "Host config: working_dir={} composer_file={} vendor_dir={}",
            working_dir.display(),
            composer_file.display(),
            vendor_dir.display()
        );

        Ok(Self {
            working_dir,
            composer_file,
            vendor_dir,
        })
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn composer_file(&self) -> &Path {
        &self.composer_file
    }

    pub fn vendor_dir(&self) -> &Path {
        &self.vendor_dir
    }

    /// Parent of the vendor dir.
    pub fn project_root(&self) -> Result<PathBuf, HostConfigError> {
        self.vendor_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .ok_or_else(|| HostConfigError::NoProjectRoot(self.vendor_dir.clone()))
    }
}

fn absolute(path: &Path) -> Result<PathBuf, HostConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(HostConfigError::WorkingDir)?;
    Ok(cwd.join(path))
}

fn read_manifest(path: &Path) -> Result<ComposerManifest, HostConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No manifest at {}, using defaults", path.display());
            return Ok(ComposerManifest::default());
        }
        Err(source) => {
            return Err(HostConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw).map_err(|source| HostConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

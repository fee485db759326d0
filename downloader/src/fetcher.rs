/// Scaffold fetcher: resolves each configured path against the URL template,
/// downloads it and writes it under the destination directory.
///
/// Files are processed strictly one after another. The first failure stops
/// the run; files already written are left in place and reported.
use std::path::Path;

use sm_scaffold_shared::errors::{FetchError, FetchFailure, FetchResult};
use sm_scaffold_shared::models::{FetchOutcome, FetchReport, ScaffoldRequest};
use tracing::{info, warn};

use crate::template::{resolve_url, validate_request};
use crate::transport::{HttpTransport, Transport};

pub struct Fetcher<T> {
    transport: T,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Download every file in `request.file_list`, in order.
    pub async fn fetch(&self, request: &ScaffoldRequest) -> Result<FetchReport, FetchFailure> {
        let mut report = FetchReport::begin();

        if let Err(error) = validate_request(request) {
            warn!("Rejected scaffold request: {}", error);
            return Err(abort(error, report));
        }

        if let Err(source) = tokio::fs::create_dir_all(&request.destination_dir).await {
            let error = FetchError::Filesystem {
                target: request.destination_dir.clone(),
                source,
            };
            warn!("{}", error);
            return Err(abort(error, report));
        }

        info!(
            "Fetching {} scaffold file(s) at {} into {}",
            request.file_list.len(),
            request.version,
            request.destination_dir.display()
        );

        for path in &request.file_list {
            match self.fetch_one(request, path).await {
                Ok(bytes) => report.record(FetchOutcome::written(path, bytes)),
                Err(error) => {
                    warn!("Failed to fetch {}: {}", path, error);
                    report.record(FetchOutcome::failed(path, &error));
                    return Err(abort(error, report));
                }
            }
        }

        report.finish();
        info!(
            "Scaffold complete: {} file(s), {} bytes",
            report.succeeded(),
            report.bytes_written()
        );
        Ok(report)
    }

    async fn fetch_one(&self, request: &ScaffoldRequest, path: &str) -> FetchResult<u64> {
        let url = resolve_url(&request.url_template, &request.version, path)?;
        info!("  - fetching {} ({})", path, url);

        let body = self
            .transport
            .get(&url)
            .await
            .map_err(|e| e.into_fetch_error(path, url.as_str()))?;

        let target = request.target_path(path);
        write_file(&target, &body).await?;
        info!("  - wrote {} ({} bytes)", target.display(), body.len());
        Ok(body.len() as u64)
    }

    /// Run [`Fetcher::fetch`] to completion on a private current-thread runtime.
    ///
    /// For synchronous callers such as build scripts. Must not be called from
    /// inside an async runtime.
    pub fn fetch_blocking(&self, request: &ScaffoldRequest) -> Result<FetchReport, FetchFailure> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                abort(
                    FetchError::Config(format!("Cannot start async runtime: {}", e)),
                    FetchReport::begin(),
                )
            })?;
        runtime.block_on(self.fetch(request))
    }
}

/// Fetch `request` over HTTP with the default timeout, blocking the caller.
pub fn fetch_blocking(request: &ScaffoldRequest) -> Result<FetchReport, FetchFailure> {
    let transport =
        HttpTransport::with_default_timeout().map_err(|e| abort(e, FetchReport::begin()))?;
    Fetcher::new(transport).fetch_blocking(request)
}

fn abort(error: FetchError, mut report: FetchReport) -> FetchFailure {
    report.finish();
    FetchFailure::new(error, report)
}

/// Write `body` to `target`, creating parents and truncating any existing file.
async fn write_file(target: &Path, body: &[u8]) -> FetchResult<()> {
    let fs_err = |source| FetchError::Filesystem {
        target: target.to_path_buf(),
        source,
    };
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(fs_err)?;
    }
    tokio::fs::write(target, body).await.map_err(fs_err)
}

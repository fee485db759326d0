/// Runs the scaffold download for a host project.
use sm_scaffold_downloader::{Fetcher, Transport};
use sm_scaffold_shared::errors::{FetchFailure, HostConfigError};
use sm_scaffold_shared::events::ScriptEvent;
use sm_scaffold_shared::host_config::HostConfig;
use sm_scaffold_shared::models::{FetchReport, ScaffoldRequest};
use tracing::info;

pub struct Handler<T> {
    host: HostConfig,
    fetcher: Fetcher<T>,
}

impl<T: Transport> Handler<T> {
    pub fn new(host: HostConfig, transport: T) -> Self {
        Self {
            host,
            fetcher: Fetcher::new(transport),
        }
    }

    /// Callback for the post-update lifecycle event.
    pub async fn on_post_cmd_event(&self, event: ScriptEvent) -> Result<FetchReport, FetchFailure> {
        info!("{} fired, downloading scaffold", event);
        self.download_scaffold().await
    }

    /// The Site Manager scaffold request for this project.
    pub fn scaffold_request(&self) -> Result<ScaffoldRequest, HostConfigError> {
        Ok(ScaffoldRequest::site_manager(self.host.project_root()?))
    }

    /// Download the scaffold files into the project root.
    pub async fn download_scaffold(&self) -> Result<FetchReport, FetchFailure> {
        let request = self
            .scaffold_request()
            .map_err(|e| FetchFailure::new(e.into(), FetchReport::begin()))?;
        self.fetcher.fetch(&request).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sm_scaffold_downloader::{resolve_url, Url};
    use sm_scaffold_shared::errors::{ErrorKind, TransportError};
    use sm_scaffold_shared::host_config::EnvOverrides;
    use sm_scaffold_shared::models::{SITE_MANAGER_FILES, SITE_MANAGER_SOURCE};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serves `<name> body` for every scaffold file unless told to fail one.
    #[derive(Default)]
    pub(crate) struct StubTransport {
        pub fail_path: Option<&'static str>,
        pub requests: Mutex<Vec<String>>,
    }

    impl Transport for StubTransport {
        async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
            self.requests.lock().unwrap().push(url.to_string());
            let name = url.path().rsplit('/').next().unwrap_or_default().to_string();
            if self.fail_path == Some(name.as_str()) {
                return Err(TransportError::Status(404));
            }
            Ok(format!("{} body", name).into_bytes())
        }
    }

    pub(crate) fn host_for(dir: &TempDir, vendor_dir: Option<&str>) -> HostConfig {
        let overrides = EnvOverrides {
            composer_file: None,
            vendor_dir: vendor_dir.map(String::from),
        };
        HostConfig::load_with(dir.path(), &overrides).unwrap()
    }

    #[test]
    fn test_request_targets_vendor_parent() {
        let dir = TempDir::new().unwrap();
        let handler = Handler::new(host_for(&dir, Some("web/vendor")), StubTransport::default());
        let request = handler.scaffold_request().unwrap();
        assert_eq!(request.destination_dir, dir.path().join("web"));
        assert_eq!(request.url_template, SITE_MANAGER_SOURCE);
        assert_eq!(request.version, "master");
    }

    #[tokio::test]
    async fn test_download_scaffold_writes_project_root() {
        let dir = TempDir::new().unwrap();
        let handler = Handler::new(host_for(&dir, None), StubTransport::default());

        let report = handler.download_scaffold().await.unwrap();

        assert_eq!(report.succeeded(), 3);
        for name in SITE_MANAGER_FILES {
            let body = std::fs::read_to_string(dir.path().join(name)).unwrap();
            assert_eq!(body, format!("{} body", name));
        }
        let expected: Vec<String> = SITE_MANAGER_FILES
            .iter()
            .map(|name| resolve_url(SITE_MANAGER_SOURCE, "master", name).unwrap().to_string())
            .collect();
        assert_eq!(*handler.fetcher.transport().requests.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_failure_surfaces_file_name() {
        let dir = TempDir::new().unwrap();
        let transport = StubTransport {
            fail_path: Some("RoboFileBase.php"),
            ..Default::default()
        };
        let handler = Handler::new(host_for(&dir, None), transport);

        let failure = handler.on_post_cmd_event(ScriptEvent::PostUpdateCmd).await.unwrap_err();

        assert_eq!(failure.kind(), ErrorKind::HttpStatus);
        assert!(failure.to_string().contains("RoboFileBase.php"));
        assert!(!dir.path().join("dsh").exists());
    }
}

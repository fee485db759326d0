/// HTTP transport used by the fetcher.
///
/// The fetcher only needs "GET this URL, give me the body"; keeping that
/// behind a trait lets tests substitute an in-memory transport.
use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use sm_scaffold_shared::errors::{FetchError, TransportError};
use tracing::debug;

/// Request timeout applied when the caller does not choose one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("sm-scaffold/", env!("CARGO_PKG_VERSION"));

/// Fetches the full body of a URL.
pub trait Transport {
    /// Returns the body on a 2xx response; anything else is an error.
    fn get(&self, url: &Url) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Config(format!("Cannot build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_default_timeout() -> Result<Self, FetchError> {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        debug!("GET {} -> {}", url, status);
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify)?;
        Ok(body.to_vec())
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use std::net::SocketAddr;

    async fn serve_file(Path((version, path)): Path<(String, String)>) -> (StatusCode, Vec<u8>) {
        match (version.as_str(), path.trim_start_matches('/')) {
            ("v2", "dsh") => (StatusCode::OK, b"#!/usr/bin/env bash\necho dsh\n".to_vec()),
            ("v2", "bin/blob") => (StatusCode::OK, vec![0, 159, 146, 150, 255]),
            ("v2", "slow") => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                (StatusCode::OK, Vec::new())
            }
            _ => (StatusCode::NOT_FOUND, b"404: Not Found".to_vec()),
        }
    }

    async fn spawn_server() -> SocketAddr {
        let app = Router::new().route("/:version/*path", get(serve_file));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn url(addr: SocketAddr, rest: &str) -> Url {
        Url::parse(&format!("http://{}/{}", addr, rest)).unwrap()
    }

    #[tokio::test]
    async fn test_get_returns_body() {
        let addr = spawn_server().await;
        let transport = HttpTransport::with_default_timeout().unwrap();
        let body = transport.get(&url(addr, "v2/dsh")).await.unwrap();
        assert_eq!(body, b"#!/usr/bin/env bash\necho dsh\n");
    }

    #[tokio::test]
    async fn test_binary_body_is_untouched() {
        let addr = spawn_server().await;
        let transport = HttpTransport::with_default_timeout().unwrap();
        let body = transport.get(&url(addr, "v2/bin/blob")).await.unwrap();
        assert_eq!(body, vec![0, 159, 146, 150, 255]);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let addr = spawn_server().await;
        let transport = HttpTransport::with_default_timeout().unwrap();
        let err = transport.get(&url(addr, "v2/missing")).await.unwrap_err();
        assert_eq!(err, TransportError::Status(404));
    }

    #[tokio::test]
    async fn test_timeout() {
        let addr = spawn_server().await;
        let transport = HttpTransport::new(Duration::from_millis(200)).unwrap();
        let err = transport.get(&url(addr, "v2/slow")).await.unwrap_err();
        assert_eq!(err, TransportError::Timeout);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::with_default_timeout().unwrap();
        let err = transport.get(&url(addr, "v2/dsh")).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }
}

//! Downloads scaffold files described by a URL template into a project
//! directory, one file at a time, stopping at the first failure.
pub mod fetcher;
pub mod template;
pub mod transport;

pub use fetcher::{fetch_blocking, Fetcher};
pub use reqwest::Url;
pub use template::resolve_url;
pub use transport::{HttpTransport, Transport, DEFAULT_TIMEOUT};

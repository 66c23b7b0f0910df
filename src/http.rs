//! HTTP client construction for direct media downloads.
//!
//! The direct engine talks to plain file hosts, some of which refuse obvious
//! bot user agents, so the default header set mimics a desktop browser. The
//! client carries tracing and retry middleware: transient failures are
//! retried with exponential backoff before an item is marked failed.
//!
//! # Examples
//!
//! ```rust
//! use vidq::http::{build_client, HttpConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = build_client(HttpConfig::default())?;
//! # Ok(())
//! # }
//! ```
//!
//! ```rust,no_run
//! use vidq::http::HttpConfig;
//! use reqwest::Proxy;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpConfig {
//!     retries: 5,
//!     proxy: Some(Proxy::http("http://proxy.example.com:8080")?),
//!     ..HttpConfig::default()
//! };
//! # Ok(())
//! # }
//! ```

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Proxy;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use reqwest_tracing::TracingMiddleware;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Options for the middleware HTTP client used by the direct engine.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Retries per request with exponential backoff.
    pub retries: u32,
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Default headers; [`browser_headers`] unless overridden.
    pub headers: HeaderMap,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            proxy: None,
            headers: browser_headers(),
        }
    }
}

/// Default header set mimicking a desktop browser.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers
}

/// Build the middleware client: request tracing plus transient-failure
/// retries with exponential backoff.
pub fn build_client(config: HttpConfig) -> Result<ClientWithMiddleware, reqwest::Error> {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.retries);

    let mut builder = reqwest::Client::builder().default_headers(config.headers);
    if let Some(proxy) = config.proxy {
        builder = builder.proxy(proxy);
    }
    let client = builder.build()?;

    Ok(ClientBuilder::new(client)
        .with(TracingMiddleware::default())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

//! Transport seam between the request pipeline and the network.
//!
//! `HttpTransport` is the production implementation on top of reqwest. The
//! underlying `reqwest::Client` is created lazily on the first request and
//! reused (keep-alive) until the transport is released.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Certificate, Client};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

use cp_core::error::{CpError, CpResult};

use crate::request::HttpMethod;

/// A fully assembled request, ready to put on the wire.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// The exchange did not complete (DNS, connect, TLS, timeout, body read).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportFailure {
    pub message: String,
    /// Last HTTP status the transport saw, 0 if none.
    pub status: u16,
}

/// Executes one prepared request and reports the raw outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, TransportFailure>;

    /// Drop any pooled connection state.
    fn release(&mut self) {}
}

/// reqwest-backed transport with an optional custom CA bundle.
pub struct HttpTransport {
    ca_cert: Option<PathBuf>,
    inner: OnceCell<Client>,
}

impl HttpTransport {
    /// Create a transport. A configured bundle must exist; it is read when the
    /// connection is first established.
    pub fn new(ca_cert: Option<PathBuf>) -> CpResult<Self> {
        if let Some(path) = &ca_cert {
            ensure_cert_exists(path)?;
        }
        Ok(Self {
            ca_cert,
            inner: OnceCell::new(),
        })
    }

    /// Replace the CA bundle. `None` restores the built-in roots.
    ///
    /// Fails with `Internal` when the file does not exist; the network is not
    /// touched. Any existing connection is discarded so the next request
    /// picks up the new roots.
    pub fn set_ca_cert(&mut self, path: Option<PathBuf>) -> CpResult<()> {
        if let Some(p) = &path {
            ensure_cert_exists(p)?;
        }
        self.ca_cert = path;
        self.inner.take();
        Ok(())
    }

    pub fn ca_cert(&self) -> Option<&Path> {
        self.ca_cert.as_deref()
    }

    /// Whether the underlying client has been built yet.
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized()
    }

    async fn client(&self) -> Result<&Client, TransportFailure> {
        self.inner
            .get_or_try_init(|| async { self.build_client() })
            .await
    }

    fn build_client(&self) -> Result<Client, TransportFailure> {
        debug!("initializing connection");
        let mut builder = Client::builder().tcp_keepalive(Duration::from_secs(30));

        if let Some(path) = &self.ca_cert {
            debug!("loading certificate bundle from {}", path.display());
            let pem = std::fs::read(path).map_err(|e| TransportFailure {
                message: format!("failed to read certificate {}: {e}", path.display()),
                status: 0,
            })?;
            let certs = Certificate::from_pem_bundle(&pem).map_err(|e| TransportFailure {
                message: format!("invalid certificate bundle {}: {e}", path.display()),
                status: 0,
            })?;
            builder = builder.tls_built_in_root_certs(false);
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        builder.build().map_err(|e| TransportFailure {
            message: format!("failed to build HTTP client: {}", error_chain(&e)),
            status: 0,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse, TransportFailure> {
        let client = self.client().await?;

        let mut builder = client
            .request(request.method.into(), &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportFailure {
            message: format!("failed to read response body: {} (HTTP code: {status})", error_chain(&e)),
            status,
        })?;

        Ok(RawResponse { status, body })
    }

    fn release(&mut self) {
        if self.inner.take().is_some() {
            debug!("connection shut down");
        }
    }
}

fn ensure_cert_exists(path: &Path) -> CpResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CpError::Internal(format!(
            "certificate not found: {}",
            path.display()
        )))
    }
}

/// Classify a reqwest error into a transport failure with a readable diagnostic.
fn classify_error(e: reqwest::Error) -> TransportFailure {
    let status = e.status().map(|s| s.as_u16()).unwrap_or(0);
    let reason = if e.is_timeout() {
        "request timed out"
    } else if e.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    TransportFailure {
        message: format!("{reason}: {} (HTTP code: {status})", error_chain(&e)),
        status,
    }
}

/// Render an error together with its sources; reqwest hides the interesting part there.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut text = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}

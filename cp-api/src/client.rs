//! HTTP client for the CloudPlugs REST API.
//!
//! `RestClient` holds the session (base URL, timeout, identity) and runs the
//! request pipeline: credential check, header and URL assembly, one exchange
//! through the transport, outcome classification. Outcomes are returned per
//! call, so a client can be shared between tasks; identity changes go through
//! `&mut self` and are therefore never racing with in-flight requests.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, warn};

use cp_core::config::ClientConfig;
use cp_core::constants::{self, headers};
use cp_core::error::{CpError, CpResult};

use crate::auth::{AuthState, Credentials};
use crate::request::RequestDescriptor;
use crate::response::{Outcome, Response};
use crate::transport::{HttpTransport, PreparedRequest, Transport};
use crate::validate::is_plug_id;

/// REST client bound to one CloudPlugs session.
pub struct RestClient<T: Transport = HttpTransport> {
    transport: T,
    /// Always ends with `/`.
    base_url: String,
    timeout: Duration,
    auth: AuthState,
}

impl RestClient<HttpTransport> {
    /// Create a client from configuration using the reqwest transport.
    pub fn new(config: &ClientConfig) -> CpResult<Self> {
        let transport = HttpTransport::new(config.ca_cert())?;
        Self::with_transport(config, transport)
    }

    /// Verify the server against the PEM bundle at `path` (`None`: built-in roots).
    pub fn set_ca_cert(&mut self, path: Option<PathBuf>) -> CpResult<()> {
        self.transport.set_ca_cert(path)
    }
}

impl<T: Transport> RestClient<T> {
    /// Create a client from configuration on top of an arbitrary transport.
    pub fn with_transport(config: &ClientConfig, transport: T) -> CpResult<Self> {
        let mut client = Self {
            transport,
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
            auth: AuthState::default(),
        };

        if !config.base_url.is_empty() {
            client.set_base_url(&config.base_url)?;
        }
        if let Some(ssl) = config.enable_ssl {
            client.enable_ssl(ssl)?;
        }
        client.set_timeout(i64::try_from(config.timeout_secs).unwrap_or(i64::MAX));

        if config.has_credentials() {
            client.set_auth(&config.auth_id, &config.auth_pass, config.is_master)?;
        } else if !config.auth_id.is_empty() {
            client.set_auth_id(&config.auth_id)?;
        }

        Ok(client)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // --- Session configuration ---

    /// Set the base URL. It must start with `http://` or `https://`; a
    /// trailing `/` is added when missing.
    pub fn set_base_url(&mut self, url: &str) -> CpResult<()> {
        if !url.starts_with(constants::HTTP_PREFIX) && !url.starts_with(constants::HTTPS_PREFIX) {
            return Err(CpError::InvalidParameter(format!("not a valid url: '{url}'")));
        }
        let mut url = url.to_string();
        if !url.ends_with('/') {
            url.push('/');
        }
        debug!("base url set to {url}");
        self.base_url = url;
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Switch the scheme of the base URL between `https://` and `http://`.
    pub fn enable_ssl(&mut self, enabled: bool) -> CpResult<()> {
        if enabled && !self.has_ssl() {
            let rest = &self.base_url[constants::HTTP_PREFIX.len()..];
            let url = format!("{}{rest}", constants::HTTPS_PREFIX);
            return self.set_base_url(&url);
        }
        if !enabled && self.has_ssl() {
            let rest = &self.base_url[constants::HTTPS_PREFIX.len()..];
            let url = format!("{}{rest}", constants::HTTP_PREFIX);
            return self.set_base_url(&url);
        }
        Ok(())
    }

    pub fn has_ssl(&self) -> bool {
        self.base_url.starts_with(constants::HTTPS_PREFIX)
    }

    /// Set the request timeout in seconds. Zero or negative restores the default.
    pub fn set_timeout(&mut self, secs: i64) {
        let secs = u64::try_from(secs)
            .ok()
            .filter(|s| *s > 0)
            .unwrap_or(constants::DEFAULT_TIMEOUT_SECS);
        self.timeout = Duration::from_secs(secs);
        debug!("timeout set to {secs}s");
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set identity and secret together. Both must be non-empty.
    pub fn set_auth(&mut self, id: &str, secret: &str, master: bool) -> CpResult<()> {
        let creds = Credentials::new(id, secret, master)?;
        debug!(id = %creds.id, master, "authentication set");
        self.auth = AuthState::from(creds);
        Ok(())
    }

    /// Change only the identity, keeping the current secret.
    pub fn set_auth_id(&mut self, id: &str) -> CpResult<()> {
        if id.is_empty() {
            return Err(CpError::InvalidParameter("auth id must be non-empty".into()));
        }
        self.auth.id = Some(id.to_string());
        Ok(())
    }

    pub fn clear_auth(&mut self) {
        self.auth = AuthState::default();
    }

    pub fn auth_id(&self) -> Option<&str> {
        self.auth.id.as_deref()
    }

    pub fn auth_pass(&self) -> Option<&str> {
        self.auth.secret.as_deref()
    }

    pub fn is_auth_master(&self) -> bool {
        self.auth.master
    }

    /// Take over the identity an enrollment was issued, returning its response.
    pub fn adopt(&mut self, outcome: Outcome) -> Response {
        match outcome {
            Outcome::Ok(response) => response,
            Outcome::OkWithNewIdentity(response, creds) => {
                info!(id = %creds.id, "adopting server-issued identity");
                self.auth = AuthState::from(creds);
                response
            }
        }
    }

    /// Release the pooled connection. The next request opens a new one.
    pub fn close(&mut self) {
        self.transport.release();
    }

    // --- Request pipeline ---

    /// Execute one request against the current session.
    ///
    /// HTTP error statuses come back as `Ok(Response)`. Only a missing
    /// credential (`InvalidLogin`, raised before any network activity) and a
    /// failed exchange (`Network`) are errors.
    pub async fn execute(&self, request: RequestDescriptor) -> CpResult<Response> {
        if request.auth_required && !self.auth.has_secret() {
            debug!("login info not found, authorization required");
            return Err(CpError::InvalidLogin(
                "authentication required but no credential is set".into(),
            ));
        }

        let url = request.url(&self.base_url);

        let mut header_list = request.extra_headers;
        header_list.extend(self.auth.headers());
        header_list.push((
            headers::CONTENT_TYPE.to_string(),
            headers::CONTENT_TYPE_JSON.to_string(),
        ));

        debug!(
            method = %request.method,
            url = %url,
            headers = ?header_list.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            body_len = request.body.as_ref().map_or(0, String::len),
            "executing request"
        );

        let prepared = PreparedRequest {
            method: request.method,
            url,
            headers: header_list,
            body: request.body,
            timeout: self.timeout,
        };

        match self.transport.execute(prepared).await {
            Ok(raw) => {
                debug!(
                    "request completed with HTTP status {} ({})",
                    raw.status,
                    constants::status_text(raw.status)
                );
                Ok(Response::new(raw.status, raw.body))
            }
            Err(failure) => {
                let message = if failure.message.is_empty() {
                    "transport failure".to_string()
                } else {
                    failure.message
                };
                warn!("request failed: {message}");
                Err(CpError::Network {
                    message,
                    status: failure.status,
                })
            }
        }
    }

    // --- Helpers shared by the endpoint modules ---

    /// The given device id, or the session identity, validated as a plug id.
    pub(crate) fn resolve_plug_id(&self, id: Option<&str>) -> CpResult<String> {
        let id = id
            .or(self.auth.id.as_deref())
            .ok_or_else(|| CpError::InvalidParameter("no device id given or configured".into()))?;
        if !is_plug_id(id) {
            return Err(CpError::InvalidParameter(format!("invalid plug id: '{id}'")));
        }
        Ok(id.to_string())
    }

    pub(crate) fn auth(&self) -> &AuthState {
        &self.auth
    }
}

impl<T: Transport> Drop for RestClient<T> {
    fn drop(&mut self) {
        self.transport.release();
    }
}

//! Request descriptors.
//!
//! A `RequestDescriptor` is the logical description of one REST call: verb,
//! resource path, query and body. It never carries authentication headers;
//! those are derived from the session when the request is executed.

use std::collections::BTreeMap;

use serde::Serialize;
use url::form_urlencoded;

use cp_core::error::{CpError, CpResult};

/// HTTP verbs used by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// One outbound REST call, built per operation and consumed once.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Fail with `InvalidLogin` before any network activity when no secret is set.
    pub auth_required: bool,
    pub method: HttpMethod,
    /// Path relative to the base URL, caller segments already escaped.
    pub path: String,
    /// Headers sent ahead of the authentication and content-type headers.
    pub extra_headers: Vec<(String, String)>,
    pub query: BTreeMap<String, String>,
    /// Pre-encoded JSON payload.
    pub body: Option<String>,
}

impl RequestDescriptor {
    /// An authenticated request with no query and no body.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            auth_required: true,
            method,
            path: path.into(),
            extra_headers: Vec::new(),
            query: BTreeMap::new(),
            body: None,
        }
    }

    /// Mark the request as usable without a configured credential.
    pub fn anonymous(mut self) -> Self {
        self.auth_required = false;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Attach an already encoded body. Empty bodies are dropped.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = if body.is_empty() { None } else { Some(body) };
        self
    }

    /// Encode `value` as JSON and attach it as the body.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> CpResult<Self> {
        let body = serde_json::to_string(value).map_err(|e| CpError::JsonEncode(e.to_string()))?;
        Ok(self.with_body(body))
    }

    /// Full URL for this request: `base + path`, plus the urlencoded query if any.
    pub fn url(&self, base: &str) -> String {
        let mut url = format!("{base}{}", self.path);
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            url.push('?');
            url.push_str(&query);
        }
        url
    }
}

/// Escape the two characters that would otherwise end a path segment.
///
/// Only `#` and `?` are touched; everything else is passed through.
pub fn encode_path_segment(segment: &str) -> String {
    segment.replace('#', "%23").replace('?', "%3F")
}

//! Session identity and the authentication headers derived from it.

use cp_core::constants::headers;
use cp_core::error::{CpError, CpResult};

/// A complete credential: identity, secret and master flag.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Plug id, or account email for account-level access.
    pub id: String,
    pub secret: String,
    /// `secret` is an account (master) password rather than a device one.
    pub master: bool,
}

impl Credentials {
    pub fn new(id: impl Into<String>, secret: impl Into<String>, master: bool) -> CpResult<Self> {
        let id = id.into();
        let secret = secret.into();
        if id.is_empty() || secret.is_empty() {
            return Err(CpError::InvalidParameter(
                "credential id and secret must be non-empty".into(),
            ));
        }
        Ok(Self { id, secret, master })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .field("master", &self.master)
            .finish()
    }
}

/// Identity currently held by a client session. Either half may be unset.
#[derive(Clone, Default)]
pub(crate) struct AuthState {
    pub(crate) id: Option<String>,
    pub(crate) secret: Option<String>,
    pub(crate) master: bool,
}

impl AuthState {
    pub(crate) fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// The identity header and the secret header, or nothing when either half is missing.
    pub(crate) fn headers(&self) -> Vec<(String, String)> {
        match (&self.id, &self.secret) {
            (Some(id), Some(secret)) => vec![identity_header(id), secret_header(secret, self.master)],
            _ => Vec::new(),
        }
    }

    /// Whether the identity is an account email rather than a plug id.
    pub(crate) fn is_email(&self) -> bool {
        self.id.as_deref().is_some_and(|id| id.contains('@'))
    }
}

impl From<Credentials> for AuthState {
    fn from(creds: Credentials) -> Self {
        Self {
            id: Some(creds.id),
            secret: Some(creds.secret),
            master: creds.master,
        }
    }
}

fn identity_header(id: &str) -> (String, String) {
    let name = if id.contains('@') {
        headers::PLUG_EMAIL
    } else {
        headers::PLUG_ID
    };
    (name.to_string(), id.to_string())
}

fn secret_header(secret: &str, master: bool) -> (String, String) {
    let name = if master {
        headers::PLUG_MASTER
    } else {
        headers::PLUG_AUTH
    };
    (name.to_string(), secret.to_string())
}

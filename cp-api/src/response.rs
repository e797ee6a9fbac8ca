//! Per-call response types.
//!
//! Every operation returns its own `Response`; nothing is kept on the client
//! between calls. HTTP error statuses are ordinary responses, callers inspect
//! `status` themselves.

use serde::de::DeserializeOwned;

use cp_core::constants::{self, fields};
use cp_core::error::{CpError, CpResult};

use crate::auth::Credentials;

/// Status code and raw body of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Body exactly as the server sent it.
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Reason phrase for the status code.
    pub fn status_text(&self) -> &'static str {
        constants::status_text(self.status)
    }

    /// Decode the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> CpResult<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| CpError::JsonParse(format!("failed to parse response: {e}")))
    }

    /// Decode the body as an untyped JSON value.
    pub fn value(&self) -> CpResult<serde_json::Value> {
        self.json()
    }

    pub fn into_body(self) -> String {
        self.body
    }

    /// The `id` a successful enrollment hands back, if the body carries one.
    pub(crate) fn issued_id(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value
            .get(fields::ID)
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }
}

/// Result of an operation that may be issued a new identity by the server.
///
/// The client does not switch identity on its own; pass the outcome to
/// `RestClient::adopt` to start using the issued credential.
#[derive(Debug, Clone)]
pub enum Outcome {
    Ok(Response),
    OkWithNewIdentity(Response, Credentials),
}

impl Outcome {
    /// Build the outcome of an enrollment that sent `pass` as the device password.
    pub(crate) fn from_enrollment(response: Response, pass: &str) -> Self {
        match response.issued_id() {
            Some(id) => match Credentials::new(id, pass, false) {
                Ok(creds) => Self::OkWithNewIdentity(response, creds),
                Err(_) => Self::Ok(response),
            },
            None => Self::Ok(response),
        }
    }

    pub fn response(&self) -> &Response {
        match self {
            Self::Ok(r) | Self::OkWithNewIdentity(r, _) => r,
        }
    }

    pub fn new_identity(&self) -> Option<&Credentials> {
        match self {
            Self::Ok(_) => None,
            Self::OkWithNewIdentity(_, creds) => Some(creds),
        }
    }

    pub fn into_response(self) -> Response {
        match self {
            Self::Ok(r) | Self::OkWithNewIdentity(r, _) => r,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_is_still_a_response() {
        let resp = Response::new(404, r#"{"error":"not found"}"#);
        assert!(!resp.is_success());
        assert_eq!(resp.status_text(), "Not found");
        assert_eq!(resp.value().unwrap()["error"], "not found");
    }

    #[test]
    fn test_json_decode_failure() {
        let resp = Response::new(200, "not json");
        let err = resp.value().unwrap_err();
        assert_eq!(err.kind(), cp_core::ErrorKind::JsonParse);
    }

    #[test]
    fn test_enrollment_with_issued_id() {
        let resp = Response::new(201, r#"{"id":"dev-012345678901234567890123","auth":"x"}"#);
        let outcome = Outcome::from_enrollment(resp, "devpass");
        let creds = outcome.new_identity().unwrap();
        assert_eq!(creds.id, "dev-012345678901234567890123");
        assert_eq!(creds.secret, "devpass");
        assert!(!creds.master);
        assert_eq!(outcome.response().status, 201);
    }

    #[test]
    fn test_enrollment_without_id_keeps_identity() {
        let resp = Response::new(400, r#"{"error":"bad model"}"#);
        let outcome = Outcome::from_enrollment(resp, "devpass");
        assert!(outcome.new_identity().is_none());

        let resp = Response::new(200, "[1,2]");
        assert!(Outcome::from_enrollment(resp, "devpass").new_identity().is_none());
    }
}

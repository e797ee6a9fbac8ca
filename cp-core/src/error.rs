//! Global error types for the CloudPlugs client.
//!
//! Every failure path in the client is a `CpError`. Each variant maps onto one
//! of the numeric `ErrorKind` codes exposed by the platform libraries so that
//! callers written against those codes keep working.

use thiserror::Error;

/// Convenience type alias for Results using CpError.
pub type CpResult<T> = Result<T, CpError>;

/// Unified error type for the CloudPlugs client.
#[derive(Error, Debug)]
pub enum CpError {
    // -- Caller errors --
    /// A field failed its validator, or a required field is missing.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No credential configured, or the operation needs a master credential.
    #[error("invalid login: {0}")]
    InvalidLogin(String),

    // -- Transport errors --
    /// The transport call itself failed (DNS, connect, TLS, timeout).
    #[error("network error: {message}")]
    Network {
        /// Diagnostic text reported by the transport.
        message: String,
        /// Last HTTP status observed by the transport, 0 if none.
        status: u16,
    },

    /// HTTP protocol level failure.
    #[error("http error: {0}")]
    Http(String),

    // -- Reserved classifications --
    /// The client session is not usable.
    #[error("invalid session")]
    InvalidSession,

    /// An unexpected internal error (also used for certificate loading).
    #[error("internal error: {0}")]
    Internal(String),

    /// Allocation failure reported by a lower layer.
    #[error("out of memory")]
    OutOfMemory,

    /// A JSON document could not be parsed.
    #[error("json parse error: {0}")]
    JsonParse(String),

    /// A value could not be encoded as JSON.
    #[error("json encode error: {0}")]
    JsonEncode(String),

    // -- Local environment --
    /// Failed to load or parse configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CpError {
    /// The numeric classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::InvalidLogin(_) => ErrorKind::InvalidLogin,
            Self::Network { .. } => ErrorKind::Network,
            Self::Http(_) => ErrorKind::Http,
            Self::InvalidSession => ErrorKind::InvalidSession,
            Self::Internal(_) | Self::Config(_) | Self::Io(_) => ErrorKind::Internal,
            Self::OutOfMemory => ErrorKind::OutOfMemory,
            Self::JsonParse(_) => ErrorKind::JsonParse,
            Self::JsonEncode(_) => ErrorKind::JsonEncode,
        }
    }

    /// HTTP status attached to a network failure, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CpError {
    fn from(e: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match e.classify() {
            Category::Syntax | Category::Data | Category::Eof => CpError::JsonParse(e.to_string()),
            Category::Io => CpError::JsonEncode(e.to_string()),
        }
    }
}

impl From<toml::de::Error> for CpError {
    fn from(e: toml::de::Error) -> Self {
        CpError::Config(e.to_string())
    }
}

/// Error codes shared with the other CloudPlugs client libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(i32)]
pub enum ErrorKind {
    /// No error.
    None = 0,
    Internal = -1,
    OutOfMemory = -2,
    InvalidSession = -3,
    QueryIsNotObject = -4,
    QueryInvalidType = -5,
    HeaderMustBeString = -6,
    InvalidParameter = -7,
    InvalidLogin = -8,
    JsonParse = -9,
    JsonEncode = -10,
    InvalidContentLength = -11,
    Http = -12,
    Network = -13,
}

impl ErrorKind {
    /// Convert an integer code to an ErrorKind. Unknown codes map to `Internal`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::None,
            -2 => Self::OutOfMemory,
            -3 => Self::InvalidSession,
            -4 => Self::QueryIsNotObject,
            -5 => Self::QueryInvalidType,
            -6 => Self::HeaderMustBeString,
            -7 => Self::InvalidParameter,
            -8 => Self::InvalidLogin,
            -9 => Self::JsonParse,
            -10 => Self::JsonEncode,
            -11 => Self::InvalidContentLength,
            -12 => Self::Http,
            -13 => Self::Network,
            _ => Self::Internal,
        }
    }

    /// Get the integer code for this kind.
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Human readable description, matching the platform library strings.
    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "No error",
            Self::Internal => "Internal Library Error",
            Self::OutOfMemory => "Out of memory",
            Self::InvalidSession => "Invalid session",
            Self::QueryIsNotObject => "Query is not an object",
            Self::QueryInvalidType => "Query contain invalid type",
            Self::HeaderMustBeString => "Header value must be a string",
            Self::InvalidParameter => "Invalid parameter",
            Self::InvalidLogin => "Invalid login",
            Self::JsonParse => "JSON parse error",
            Self::JsonEncode => "JSON encode error",
            Self::InvalidContentLength => "Invalid content length",
            Self::Http => "HTTP error",
            Self::Network => "Network Error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_roundtrip() {
        assert_eq!(ErrorKind::Network.code(), -13);
        assert_eq!(ErrorKind::from_code(-7), ErrorKind::InvalidParameter);
        assert_eq!(ErrorKind::from_code(-8), ErrorKind::InvalidLogin);
    }

    #[test]
    fn test_error_kind_unknown_code() {
        assert_eq!(ErrorKind::from_code(42), ErrorKind::Internal);
    }

    #[test]
    fn test_kind_mapping() {
        let err = CpError::Network {
            message: "connection refused".into(),
            status: 0,
        };
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.http_status(), Some(0));
        assert_eq!(CpError::InvalidSession.kind(), ErrorKind::InvalidSession);
        assert_eq!(CpError::OutOfMemory.kind().code(), -2);
        assert_eq!(
            CpError::InvalidLogin("no secret".into()).kind(),
            ErrorKind::InvalidLogin
        );
    }

    #[test]
    fn test_json_error_classification() {
        let err: CpError = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::JsonParse);
    }

    #[test]
    fn test_json_write_failure_is_encode_error() {
        struct Broken;
        impl std::io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let err: CpError = serde_json::to_writer(Broken, &[1, 2, 3]).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::JsonEncode);
    }

    #[test]
    fn test_cp_error_display() {
        let err = CpError::InvalidParameter("model".to_string());
        assert_eq!(err.to_string(), "invalid parameter: model");
        assert_eq!(ErrorKind::InvalidLogin.to_string(), "Invalid login");
    }
}

//! Platform-wide constants.

/// Application name.
pub const APP_NAME: &str = "CloudPlugs";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudplugs.com/iot/";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const HTTP_PREFIX: &str = "http://";
pub const HTTPS_PREFIX: &str = "https://";

/// Length of a plug id (device or account identifier).
pub const PLUG_ID_LEN: usize = 28;

/// Length of a published data object id.
pub const OID_LEN: usize = 24;

pub const MAX_LONGITUDE: f64 = 180.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LATITUDE: f64 = -90.0;

/// Authentication and content headers understood by the platform.
pub mod headers {
    pub const PLUG_ID: &str = "X-Plug-Id";
    pub const PLUG_EMAIL: &str = "X-Plug-Email";
    pub const PLUG_AUTH: &str = "X-Plug-Auth";
    pub const PLUG_MASTER: &str = "X-Plug-Master";
    pub const CONTENT_TYPE: &str = "Content-type";
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

/// REST resource paths.
pub mod paths {
    pub const DATA: &str = "data";
    pub const DEVICE: &str = "device";
    pub const CHANNEL: &str = "channel";
    pub const LOCATION: &str = "location";
}

/// Body and query field names.
pub mod fields {
    pub const CTRL: &str = "ctrl";
    pub const HWID: &str = "hwid";
    pub const NAME: &str = "name";
    pub const MODEL: &str = "model";
    pub const PASS: &str = "pass";
    pub const PERM: &str = "perm";
    pub const PROPS: &str = "props";
    pub const STATUS: &str = "status";
    pub const PROP_LINKS: &str = "prop_links";
    pub const BEFORE: &str = "before";
    pub const AFTER: &str = "after";
    pub const OF: &str = "of";
    pub const OFFSET: &str = "offset";
    pub const LIMIT: &str = "limit";
    pub const ID: &str = "id";
    pub const AT: &str = "at";
    pub const CHANNEL_MASK: &str = "channel_mask";
    pub const LONGITUDE: &str = "x";
    pub const LATITUDE: &str = "y";
    pub const ALTITUDE: &str = "z";
    pub const ACCURACY: &str = "r";
    pub const TIMESTAMP: &str = "t";
}

/// Reason phrase for an HTTP status, as reported by the platform libraries.
pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "Ok",
        201 => "Created",
        207 => "Multi-Status",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown Result",
    }
}

//! CloudPlugs API - HTTP client for the CloudPlugs IoT platform REST API.
//!
//! This crate provides a typed client for device enrollment, property and
//! location management, data publishing and querying, and channel listing.
//! Every operation validates its parameters, issues exactly one HTTP request
//! and hands the status and raw body back to the caller.

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod request;
pub mod response;
pub mod transport;
pub mod validate;

// Re-export key types
pub use auth::Credentials;
pub use client::RestClient;
pub use endpoints::control::{ControlDevice, EnrollController, EnrollProduct, EnrollPrototype};
pub use endpoints::data::{DataEntry, DataQuery, DataRemoval};
pub use endpoints::device::{DeviceLocation, DeviceUpdate};
pub use request::{HttpMethod, RequestDescriptor};
pub use response::{Outcome, Response};
pub use transport::{HttpTransport, PreparedRequest, RawResponse, Transport, TransportFailure};

//! API endpoint modules organized by resource.
//!
//! Each module adds typed operations to `RestClient` for one group of
//! related endpoints.

pub mod channel;
pub mod control;
pub mod data;
pub mod device;

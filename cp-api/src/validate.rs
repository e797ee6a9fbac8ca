//! Per-field validation of operation parameters.
//!
//! Only the primitive kinds are checked here: plug ids, object ids, non-empty
//! strings and non-negative integers. Structured kinds (permission filters,
//! property maps, id and timestamp lists) are accepted as-is and left for the
//! server to judge.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use cp_core::constants::{self, OID_LEN, PLUG_ID_LEN};
use cp_core::error::{CpError, CpResult};

/// Every kind of field the REST API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Ctrl,
    Hwid,
    Name,
    Model,
    Pass,
    Perm,
    Props,
    Status,
    PropLinks,
    Data,
    Before,
    After,
    Of,
    Offset,
    Limit,
    Auth,
    Id,
    Oid,
    At,
    ChannelMask,
    Location,
    Longitude,
    Latitude,
    Accuracy,
    Altitude,
    Timestamp,
    PlugId,
    PlugIdArr,
    PlugIdCsv,
    TimestampArr,
    TimestampCsv,
    OidArr,
    OidCsv,
}

impl FieldKind {
    /// Whether `value` is acceptable for this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::PlugId | Self::Model => value.as_str().is_some_and(is_plug_id),
            Self::Oid => value.as_str().is_some_and(is_oid),
            Self::Hwid | Self::Name | Self::ChannelMask => {
                value.as_str().is_some_and(|s| !s.is_empty())
            }
            Self::Ctrl | Self::Pass | Self::Status | Self::Auth => value.is_string(),
            Self::Data => !is_blank(value),
            Self::Before | Self::After => {
                Self::Timestamp.accepts(value) || Self::Oid.accepts(value)
            }
            Self::Offset | Self::Limit => value.is_u64(),
            Self::Perm
            | Self::Props
            | Self::PropLinks
            | Self::Of
            | Self::Id
            | Self::At
            | Self::Location
            | Self::Longitude
            | Self::Latitude
            | Self::Accuracy
            | Self::Altitude
            | Self::Timestamp
            | Self::PlugIdArr
            | Self::PlugIdCsv
            | Self::TimestampArr
            | Self::TimestampCsv
            | Self::OidArr
            | Self::OidCsv => true,
        }
    }
}

/// A plug id is exactly 28 bytes long.
pub fn is_plug_id(s: &str) -> bool {
    s.len() == PLUG_ID_LEN
}

/// An object id is exactly 24 bytes long.
pub fn is_oid(s: &str) -> bool {
    s.len() == OID_LEN
}

/// Longitude must lie in [-180, 180] and latitude in [-90, 90].
pub fn check_coordinates(longitude: f64, latitude: f64) -> CpResult<()> {
    if !(constants::MIN_LONGITUDE..=constants::MAX_LONGITUDE).contains(&longitude) {
        return Err(CpError::InvalidParameter(format!(
            "longitude {longitude} out of range"
        )));
    }
    if !(constants::MIN_LATITUDE..=constants::MAX_LATITUDE).contains(&latitude) {
        return Err(CpError::InvalidParameter(format!(
            "latitude {latitude} out of range"
        )));
    }
    Ok(())
}

/// Whether a payload value counts as "not given": null or the empty string.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// The named fields of one operation, as a JSON object. Null fields count as absent.
#[derive(Debug, Clone, Default)]
pub struct ParamBag(Map<String, Value>);

impl ParamBag {
    /// Serialize typed parameters into a bag. They must serialize to an object.
    pub fn from_params<T: Serialize + ?Sized>(params: &T) -> CpResult<Self> {
        match serde_json::to_value(params).map_err(|e| CpError::JsonEncode(e.to_string()))? {
            Value::Object(map) => Ok(Self(
                map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
            )),
            other => Err(CpError::InvalidParameter(format!(
                "parameters must be an object, got {other}"
            ))),
        }
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The field must be present and valid for `kind`.
    pub fn require(&self, field: &str, kind: FieldKind) -> CpResult<()> {
        match self.0.get(field) {
            None => Err(CpError::InvalidParameter(format!("missing field: {field}"))),
            Some(value) if !kind.accepts(value) => {
                Err(CpError::InvalidParameter(format!("invalid field: {field}")))
            }
            Some(_) => Ok(()),
        }
    }

    /// The field may be absent; when present it must be valid for `kind`.
    pub fn check(&self, field: &str, kind: FieldKind) -> CpResult<()> {
        if self.has(field) {
            self.require(field, kind)
        } else {
            Ok(())
        }
    }

    /// Remove a field, returning its value.
    pub fn take(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Remove a string field.
    pub fn take_str(&mut self, field: &str) -> Option<String> {
        match self.0.remove(field) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Encode the remaining fields as the JSON request body.
    pub fn to_json(&self) -> CpResult<String> {
        serde_json::to_string(&self.0).map_err(|e| CpError::JsonEncode(e.to_string()))
    }

    /// Flatten the remaining fields into query parameters.
    pub fn into_query(self) -> BTreeMap<String, String> {
        self.0
            .into_iter()
            .map(|(k, v)| (k, query_value(&v)))
            .collect()
    }
}

/// Render a value for a query string. Lists become comma separated.
pub fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(query_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

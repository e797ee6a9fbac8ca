//! Device endpoints: information, properties and location.

use serde::Serialize;
use serde_json::Value;

use cp_core::constants::{fields, paths};
use cp_core::error::{CpError, CpResult};

use crate::client::RestClient;
use crate::request::{encode_path_segment, HttpMethod, RequestDescriptor};
use crate::response::Response;
use crate::transport::Transport;
use crate::validate::{check_coordinates, is_blank, FieldKind, ParamBag};

/// Fields of a device that can be modified. `id` defaults to the session identity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Permission filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perm: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// "ok", "disabled" or "reactivate".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prop_links: Option<Value>,
}

/// A geolocation fix for a device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "x")]
    pub longitude: f64,
    #[serde(rename = "y")]
    pub latitude: f64,
    #[serde(rename = "z", skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Accuracy radius in meters.
    #[serde(rename = "r", skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
}

impl DeviceLocation {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            id: None,
            longitude,
            latitude,
            altitude: None,
            accuracy: None,
            timestamp: None,
        }
    }
}

fn device_path(id: &str) -> String {
    format!("{}/{id}", paths::DEVICE)
}

/// `device/{id}/{prop}`, or `device/{id}/` for the whole property set.
fn prop_path(id: &str, prop: Option<&str>) -> String {
    match prop {
        Some(prop) => format!("{}/{id}/{}", paths::DEVICE, encode_path_segment(prop)),
        None => format!("{}/{id}/", paths::DEVICE),
    }
}

fn location_path(id: &str) -> String {
    format!("{}/{id}/{}", paths::DEVICE, paths::LOCATION)
}

impl<T: Transport> RestClient<T> {
    /// Read a device's information and properties.
    pub async fn get_device(&self, id: Option<&str>) -> CpResult<Response> {
        let id = self.resolve_plug_id(id)?;
        self.execute(RequestDescriptor::new(HttpMethod::Get, device_path(&id)))
            .await
    }

    /// Modify a device's information or properties.
    pub async fn set_device(&self, update: &DeviceUpdate) -> CpResult<Response> {
        let mut bag = ParamBag::from_params(update)?;
        let id = bag.take(fields::ID);
        bag.check(fields::PERM, FieldKind::Perm)?;
        bag.check(fields::NAME, FieldKind::Name)?;
        bag.check(fields::STATUS, FieldKind::Status)?;
        bag.check(fields::PROPS, FieldKind::Props)?;
        bag.check(fields::PROP_LINKS, FieldKind::PropLinks)?;

        let id = self.resolve_plug_id(id.as_ref().and_then(Value::as_str))?;
        let request =
            RequestDescriptor::new(HttpMethod::Patch, device_path(&id)).with_body(bag.to_json()?);
        self.execute(request).await
    }

    /// Set the device location.
    pub async fn set_device_location(&self, location: &DeviceLocation) -> CpResult<Response> {
        check_coordinates(location.longitude, location.latitude)?;

        let mut bag = ParamBag::from_params(location)?;
        let id = bag.take_str(fields::ID);
        bag.require(fields::LONGITUDE, FieldKind::Longitude)?;
        bag.require(fields::LATITUDE, FieldKind::Latitude)?;
        bag.check(fields::ALTITUDE, FieldKind::Altitude)?;
        bag.check(fields::ACCURACY, FieldKind::Accuracy)?;
        bag.check(fields::TIMESTAMP, FieldKind::Timestamp)?;

        let id = self.resolve_plug_id(id.as_deref())?;
        let request =
            RequestDescriptor::new(HttpMethod::Patch, location_path(&id)).with_body(bag.to_json()?);
        self.execute(request).await
    }

    /// Read the device location.
    pub async fn get_device_location(&self, id: Option<&str>) -> CpResult<Response> {
        let id = self.resolve_plug_id(id)?;
        self.execute(RequestDescriptor::new(HttpMethod::Get, location_path(&id)))
            .await
    }

    /// Write one property (`prop` given) or a set of properties (`prop` is
    /// `None` and `value` maps names to values). A null property value
    /// deletes the property on the server.
    pub async fn set_device_prop(
        &self,
        id: Option<&str>,
        prop: Option<&str>,
        value: &Value,
    ) -> CpResult<Response> {
        if is_blank(value) {
            return Err(CpError::InvalidParameter("property value is required".into()));
        }
        let id = self.resolve_plug_id(id)?;
        let request =
            RequestDescriptor::new(HttpMethod::Patch, prop_path(&id, prop)).with_json(value)?;
        self.execute(request).await
    }

    /// Read one property, or all of them when `prop` is `None`.
    pub async fn get_device_prop(&self, id: Option<&str>, prop: Option<&str>) -> CpResult<Response> {
        let id = self.resolve_plug_id(id)?;
        self.execute(RequestDescriptor::new(HttpMethod::Get, prop_path(&id, prop)))
            .await
    }

    /// Remove a property.
    pub async fn remove_device_prop(&self, id: Option<&str>, prop: &str) -> CpResult<Response> {
        if prop.is_empty() {
            return Err(CpError::InvalidParameter("property name is required".into()));
        }
        let id = self.resolve_plug_id(id)?;
        self.execute(RequestDescriptor::new(
            HttpMethod::Delete,
            prop_path(&id, Some(prop)),
        ))
        .await
    }
}

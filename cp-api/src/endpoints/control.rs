//! Enrollment and control endpoints.
//!
//! Three operations can be issued a fresh identity by the server:
//! `enroll_product`, `enroll_controller` (only while no identity is set) and
//! `control_device`. They return an `Outcome`; the caller decides whether to
//! adopt the new credential via `RestClient::adopt`.

use serde::Serialize;
use serde_json::Value;

use cp_core::constants::{fields, paths};
use cp_core::error::{CpError, CpResult};

use crate::client::RestClient;
use crate::request::{HttpMethod, RequestDescriptor};
use crate::response::{Outcome, Response};
use crate::transport::Transport;
use crate::validate::{is_plug_id, FieldKind, ParamBag};

/// Parameters for enrolling a production device of a given model.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollProduct {
    /// Plug id of the model (product) the device belongs to.
    pub model: String,
    pub hwid: String,
    /// Device connection password.
    pub pass: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prop_links: Option<Value>,
}

/// Parameters for creating a prototype (development) device.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrollPrototype {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hwid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perm: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prop_links: Option<Value>,
}

/// Parameters for enrolling a controller device.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollController {
    pub model: String,
    /// Hardware id of the device to control.
    pub ctrl: String,
    /// Password of the controlled device.
    pub pass: String,
    /// Hardware id of the controller itself.
    pub hwid: String,
    pub name: String,
}

/// Parameters for obtaining control of another device.
#[derive(Debug, Clone, Serialize)]
pub struct ControlDevice {
    pub model: String,
    pub ctrl: String,
    pub pass: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hwid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl<T: Transport> RestClient<T> {
    /// Enroll a production device. No credential is needed; on success the
    /// outcome carries the issued device identity.
    pub async fn enroll_product(&self, params: &EnrollProduct) -> CpResult<Outcome> {
        let bag = ParamBag::from_params(params)?;
        bag.require(fields::MODEL, FieldKind::PlugId)?;
        bag.require(fields::HWID, FieldKind::Hwid)?;
        bag.require(fields::PASS, FieldKind::Pass)?;
        bag.check(fields::PROPS, FieldKind::Props)?;
        bag.check(fields::PROP_LINKS, FieldKind::PropLinks)?;

        let request = RequestDescriptor::new(HttpMethod::Post, paths::DEVICE)
            .anonymous()
            .with_body(bag.to_json()?);
        let response = self.execute(request).await?;
        Ok(Outcome::from_enrollment(response, &params.pass))
    }

    /// Create a prototype device. Requires a master credential.
    pub async fn enroll_prototype(&self, params: &EnrollPrototype) -> CpResult<Response> {
        let bag = ParamBag::from_params(params)?;
        bag.require(fields::NAME, FieldKind::Name)?;
        bag.check(fields::HWID, FieldKind::Hwid)?;
        bag.check(fields::PASS, FieldKind::Pass)?;
        bag.check(fields::PERM, FieldKind::Perm)?;
        bag.check(fields::PROPS, FieldKind::Props)?;
        bag.check(fields::PROP_LINKS, FieldKind::PropLinks)?;

        if !self.is_auth_master() {
            return Err(CpError::InvalidLogin("master authentication required".into()));
        }

        let request =
            RequestDescriptor::new(HttpMethod::Post, paths::DEVICE).with_body(bag.to_json()?);
        self.execute(request).await
    }

    /// Enroll a controller device. Only allowed while the session has no
    /// identity or is logged in with an account email. The issued identity is
    /// offered only when the session had none.
    pub async fn enroll_controller(&self, params: &EnrollController) -> CpResult<Outcome> {
        let unauthenticated = self.auth_id().is_none();
        if !unauthenticated && !self.auth().is_email() {
            return Err(CpError::InvalidParameter(
                "controller enrollment needs no identity or an account email".into(),
            ));
        }

        let bag = ParamBag::from_params(params)?;
        bag.require(fields::MODEL, FieldKind::PlugId)?;
        bag.require(fields::CTRL, FieldKind::Ctrl)?;
        bag.require(fields::PASS, FieldKind::Pass)?;
        bag.require(fields::HWID, FieldKind::Hwid)?;
        bag.require(fields::NAME, FieldKind::Name)?;

        let request = RequestDescriptor::new(HttpMethod::Put, paths::DEVICE)
            .anonymous()
            .with_body(bag.to_json()?);
        let response = self.execute(request).await?;

        if unauthenticated {
            Ok(Outcome::from_enrollment(response, &params.pass))
        } else {
            Ok(Outcome::Ok(response))
        }
    }

    /// Obtain control privileges over a device. On success the outcome carries
    /// the controller identity issued by the server.
    pub async fn control_device(&self, params: &ControlDevice) -> CpResult<Outcome> {
        let bag = ParamBag::from_params(params)?;
        bag.require(fields::MODEL, FieldKind::Model)?;
        bag.require(fields::CTRL, FieldKind::Ctrl)?;
        bag.require(fields::PASS, FieldKind::Pass)?;
        bag.check(fields::HWID, FieldKind::Hwid)?;
        bag.check(fields::NAME, FieldKind::Name)?;

        let request =
            RequestDescriptor::new(HttpMethod::Put, paths::DEVICE).with_body(bag.to_json()?);
        let response = self.execute(request).await?;
        Ok(Outcome::from_enrollment(response, &params.pass))
    }

    /// Give up control of devices. `controlled` lists the controlled plug ids
    /// to release (all of them when `None`). A string list is sent as a JSON
    /// string, not as the raw body the other platform libraries send.
    pub async fn uncontrol_device(
        &self,
        id: Option<&str>,
        controlled: Option<&Value>,
    ) -> CpResult<Response> {
        let id = self.resolve_plug_id(id)?;
        if let Some(list) = controlled {
            if !FieldKind::PlugIdArr.accepts(list) {
                return Err(CpError::InvalidParameter("invalid controlled device list".into()));
            }
        }

        let mut request = RequestDescriptor::new(HttpMethod::Delete, format!("{}/{id}", paths::DEVICE));
        if let Some(list) = controlled {
            request = request.with_json(list)?;
        }
        self.execute(request).await
    }

    /// Remove devices. `ids` is a plug id, a CSV of plug ids or an array of
    /// them; when `None` the session identity is removed. A single id or a
    /// CSV goes out as a JSON string (`"a,b"`), not as a raw text body.
    pub async fn unenroll(&self, ids: Option<&Value>) -> CpResult<Response> {
        let body = match ids {
            Some(list) if list.is_array() => {
                if !FieldKind::PlugIdArr.accepts(list) {
                    return Err(CpError::InvalidParameter("invalid plug id list".into()));
                }
                list.clone()
            }
            Some(Value::String(s)) if !s.is_empty() => Value::String(s.clone()),
            Some(_) => {
                return Err(CpError::InvalidParameter(
                    "expected a plug id, a CSV of plug ids or an array".into(),
                ))
            }
            None => match self.auth_id() {
                Some(id) if is_plug_id(id) => Value::String(id.to_string()),
                _ => {
                    return Err(CpError::InvalidParameter(
                        "no device to unenroll given or configured".into(),
                    ))
                }
            },
        };

        let request = RequestDescriptor::new(HttpMethod::Delete, paths::DEVICE).with_json(&body)?;
        self.execute(request).await
    }
}

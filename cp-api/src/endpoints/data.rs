//! Data endpoints: publish, retrieve and remove published values.

use serde::Serialize;
use serde_json::Value;

use cp_core::constants::{fields, paths};
use cp_core::error::{CpError, CpResult};

use crate::client::RestClient;
use crate::request::{encode_path_segment, HttpMethod, RequestDescriptor};
use crate::response::Response;
use crate::transport::Transport;
use crate::validate::{FieldKind, ParamBag};

/// One data entry to publish. Several entries may be published at once as a list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataEntry {
    /// Object id of an existing entry to update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Overrides the channel in the URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<Value>,
    /// Publish on behalf of this plug id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub of: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<Value>,
    /// Lifetime in seconds, ignored when `expire_at` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl DataEntry {
    pub fn new(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }
}

/// Filter shared by data retrieval and channel listing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataQuery {
    pub channel_mask: String,
    /// Timestamp or object id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    /// Timestamp or object id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
    /// Timestamp, CSV of timestamps or array of timestamps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<Value>,
    /// Plug id, CSV of plug ids or array of plug ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub of: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl DataQuery {
    pub fn new(channel_mask: impl Into<String>) -> Self {
        Self {
            channel_mask: channel_mask.into(),
            ..Default::default()
        }
    }

    /// Validate and split into the channel mask and the query parameters.
    pub(crate) fn into_parts(&self) -> CpResult<(String, std::collections::BTreeMap<String, String>)> {
        let mut bag = ParamBag::from_params(self)?;
        bag.require(fields::CHANNEL_MASK, FieldKind::ChannelMask)?;
        bag.check(fields::BEFORE, FieldKind::Before)?;
        bag.check(fields::AFTER, FieldKind::After)?;
        bag.check(fields::AT, FieldKind::TimestampCsv)?;
        bag.check(fields::OF, FieldKind::PlugIdCsv)?;
        bag.check(fields::OFFSET, FieldKind::Offset)?;
        bag.check(fields::LIMIT, FieldKind::Limit)?;

        let mask = bag.take_str(fields::CHANNEL_MASK).unwrap_or_default();
        Ok((mask, bag.into_query()))
    }
}

/// Selection of published entries to delete. At least one of `id`,
/// `before`, `after` or `at` must be set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataRemoval {
    pub channel_mask: String,
    /// Object id, CSV of object ids or array of object ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub of: Option<Value>,
}

impl<T: Transport> RestClient<T> {
    /// Publish data, optionally on a channel. `data` is a `DataEntry`, a list
    /// of them, or any JSON value accepted by the platform.
    pub async fn publish_data<D: Serialize + ?Sized>(
        &self,
        data: &D,
        channel: Option<&str>,
    ) -> CpResult<Response> {
        let value = serde_json::to_value(data).map_err(|e| CpError::JsonEncode(e.to_string()))?;
        if !FieldKind::Data.accepts(&value) {
            return Err(CpError::InvalidParameter("data is required".into()));
        }

        let path = match channel {
            Some(channel) => format!("{}/{}", paths::DATA, encode_path_segment(channel)),
            None => paths::DATA.to_string(),
        };
        let request = RequestDescriptor::new(HttpMethod::Put, path).with_json(&value)?;
        self.execute(request).await
    }

    /// Read published data matching a channel mask.
    pub async fn retrieve_data(&self, query: &DataQuery) -> CpResult<Response> {
        let (mask, params) = query.into_parts()?;
        let path = format!("{}/{}", paths::DATA, encode_path_segment(&mask));
        self.execute(RequestDescriptor::new(HttpMethod::Get, path).with_query(params))
            .await
    }

    /// Delete published data.
    pub async fn remove_data(&self, removal: &DataRemoval) -> CpResult<Response> {
        let mut bag = ParamBag::from_params(removal)?;
        bag.require(fields::CHANNEL_MASK, FieldKind::ChannelMask)?;
        let has_selector = [fields::ID, fields::BEFORE, fields::AFTER, fields::AT]
            .iter()
            .any(|f| bag.has(f));
        if !has_selector {
            return Err(CpError::InvalidParameter(
                "one of id, before, after or at is required".into(),
            ));
        }
        bag.check(fields::ID, FieldKind::OidCsv)?;
        bag.check(fields::BEFORE, FieldKind::Before)?;
        bag.check(fields::AFTER, FieldKind::After)?;
        bag.check(fields::AT, FieldKind::TimestampCsv)?;
        bag.check(fields::OF, FieldKind::PlugIdCsv)?;

        let mask = bag.take_str(fields::CHANNEL_MASK).unwrap_or_default();
        let path = format!("{}/{}", paths::DATA, encode_path_segment(&mask));
        let request = RequestDescriptor::new(HttpMethod::Delete, path).with_body(bag.to_json()?);
        self.execute(request).await
    }
}

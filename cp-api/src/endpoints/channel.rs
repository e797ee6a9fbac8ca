//! Channel endpoints.

use cp_core::constants::paths;
use cp_core::error::CpResult;

use crate::client::RestClient;
use crate::endpoints::data::DataQuery;
use crate::request::{encode_path_segment, HttpMethod, RequestDescriptor};
use crate::response::Response;
use crate::transport::Transport;

impl<T: Transport> RestClient<T> {
    /// List the channels holding published data that matches the filter.
    pub async fn list_channels(&self, query: &DataQuery) -> CpResult<Response> {
        let (mask, params) = query.into_parts()?;
        let path = format!("{}/{}", paths::CHANNEL, encode_path_segment(&mask));
        self.execute(RequestDescriptor::new(HttpMethod::Get, path).with_query(params))
            .await
    }
}

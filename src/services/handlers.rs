//! HTTP handlers for registration and discovery.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error};

use crate::core::state::AppState;
use crate::data::cache::TemplateError;
use crate::data::registry::DeviceRecord;
use crate::services::client_addr::ClientAddr;
use crate::services::listing::render_listing;

/// Query parameters accepted by `POST /`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegisterParams {
    pub id: Option<String>,
    pub name: String,
    pub address: String,
}

impl RegisterParams {
    /// Build from a raw query map. Missing `name` or `address` become empty.
    pub fn from_query(mut query: HashMap<String, String>) -> Self {
        Self {
            id: query.remove("id"),
            name: query.remove("name").unwrap_or_default(),
            address: query.remove("address").unwrap_or_default(),
        }
    }
}

/// Body of `GET /devices.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceList {
    pub devices: Vec<DeviceRecord>,
}

/// `POST /?id=&name=&address=`: store a device under the caller's address.
///
/// The query is read as a plain string map so malformed or repeated keys
/// never reject the request.
pub async fn register_device(
    State(state): State<AppState>,
    ClientAddr(partition): ClientAddr,
    Query(query): Query<HashMap<String, String>>,
) -> StatusCode {
    let params = RegisterParams::from_query(query);
    let id = state
        .registry()
        .register(&partition, params.id.as_deref(), &params.name, &params.address);
    debug!(partition = %partition, id = %id, "device registered");
    StatusCode::OK
}

/// `GET /devices.json`: devices registered from the caller's address.
pub async fn discover_json(
    State(state): State<AppState>,
    ClientAddr(partition): ClientAddr,
) -> Json<DeviceList> {
    let devices = state.registry().discover(&partition);
    debug!(partition = %partition, count = devices.len(), "serving device list");
    Json(DeviceList { devices })
}

/// `GET /`: the per-host listing page rendered with the caller's devices.
pub async fn discover_html(
    State(state): State<AppState>,
    ClientAddr(partition): ClientAddr,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Html<String>, TemplateError> {
    let devices = state.registry().discover(&partition);
    let host = request_host(&headers, &uri);
    let source = state.templates().get(&host).await?;
    render_listing(&source, &devices).map(Html)
}

/// Host name of the request without its port.
///
/// Falls back to the URI authority, which HTTP/2 clients use instead of `Host`.
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    let raw = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .unwrap_or_default();
    strip_port(raw).to_string()
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // bracketed IPv6 literal
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    host.split(':').next().unwrap_or(host)
}

impl IntoResponse for TemplateError {
    fn into_response(self) -> Response {
        error!(error = %self, "failed to render device listing");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

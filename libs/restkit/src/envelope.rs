use std::collections::HashMap;

use axum::{
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::actor::Actor;

/// Normalized view of an inbound request handed to a resource operation.
///
/// Built once per request by the handler adaptor and dropped when the
/// handler returns. The actor is threaded in explicitly from the
/// authentication check rather than read from ambient request state.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub params: HashMap<String, String>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    pub actor: Option<Actor>,
}

impl RequestEnvelope {
    /// Path parameter accessor; path parameters are always strings.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// JSON reply produced by an operation: status (default 200), extra
/// headers (default none) and the body written verbatim.
#[derive(Debug, Clone)]
pub struct JsonReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl JsonReply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

impl From<Value> for JsonReply {
    fn from(body: Value) -> Self {
        Self::ok(body)
    }
}

impl IntoResponse for JsonReply {
    fn into_response(self) -> Response {
        (self.status, self.headers, Json(self.body)).into_response()
    }
}

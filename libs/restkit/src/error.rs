use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// HTTP-shaped error: status code, extra headers and a JSON body.
///
/// This is the translation contract between a resource operation failure and
/// the HTTP response written for it. Every field has a safe default so that
/// an error carrying no shaping information still renders as a well-formed
/// `500` with a generic JSON message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("http {status}: {body}")]
pub struct HttpError {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Default for HttpError {
    fn default() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: HeaderMap::new(),
            body: json!({ "message": "Internal server error" }),
        }
    }
}

impl HttpError {
    /// An error with the given status and a `{"message": ...}` body.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: json!({ "message": message.into() }),
        }
    }

    /// Replace the JSON body entirely.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal() -> Self {
        Self::default()
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.headers, Json(self.body)).into_response()
    }
}

/// Unified error type at the handler boundary.
///
/// Operations that know how their failure should look on the wire return
/// [`OpError::Http`]; anything else degrades to a generic `500` without
/// leaking internals to the client. Handlers log the error before the
/// translated response is written.
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl OpError {
    /// Reduce to the status/headers/body triple written to the client.
    pub fn to_http(&self) -> HttpError {
        match self {
            OpError::Http(e) => e.clone(),
            OpError::Internal(_) => HttpError::default(),
        }
    }
}

impl IntoResponse for OpError {
    fn into_response(self) -> Response {
        self.to_http().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_generic_500() {
        let e = HttpError::default();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(e.headers.is_empty());
        assert_eq!(e.body, json!({ "message": "Internal server error" }));
    }

    #[test]
    fn into_response_keeps_status_and_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-reason", "gone".parse().unwrap());
        let resp = HttpError::new(StatusCode::NOT_FOUND, "missing")
            .with_headers(headers)
            .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers().get("x-reason").unwrap(), "gone");
    }

    #[test]
    fn bare_internal_error_degrades_to_generic_500() {
        let err = OpError::Internal(anyhow::anyhow!("connection reset by peer"));
        let http = err.to_http();
        assert_eq!(http.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(http.body, json!({ "message": "Internal server error" }));
    }

    #[test]
    fn shaped_error_passes_through() {
        let err = OpError::Http(HttpError::conflict("name taken"));
        assert_eq!(err.to_http().status, StatusCode::CONFLICT);
        assert_eq!(err.to_http().body, json!({ "message": "name taken" }));
    }
}

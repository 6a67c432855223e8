//! Login route.
//!
//! A single credential-exchange route whose body schema is derived from the
//! configured field list. Credential checking is delegated to the supplied
//! handler; any failure collapses to a 401 with a fixed message.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::Request;
use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::{on, MethodRouter};
use serde_json::{json, Map, Value};

use crate::adaptor;
use crate::envelope::JsonReply;
use crate::error::{HttpError, OpError};
use crate::openapi::OperationSpec;
use crate::schema::OperationSchema;

#[derive(Debug, Clone)]
pub struct LoginOptions {
    pub path: String,
    pub method: Method,
    /// Credential field names; all become required strings in the body schema.
    pub fields: Vec<String>,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self {
            path: "/login".to_string(),
            method: Method::POST,
            fields: vec!["username".to_string(), "password".to_string()],
        }
    }
}

/// Exchanges validated credentials for a reply (typically a token body).
#[async_trait]
pub trait LoginHandler: Send + Sync {
    async fn login(&self, body: Value) -> Result<JsonReply, OpError>;
}

fn login_schema(fields: &[String]) -> OperationSchema {
    let mut props = Map::new();
    for field in fields {
        props.insert(field.clone(), json!({ "type": "string" }));
    }
    OperationSchema {
        summary: "Login".to_string(),
        description: "Login".to_string(),
        tags: vec!["login".to_string()],
        params: None,
        query: None,
        body: Some(json!({
            "type": "object",
            "additionalProperties": false,
            "properties": Value::Object(props),
            "required": fields,
        })),
        response: Some(json!({ "type": "object", "additionalProperties": true })),
    }
}

/// Build the login method router and its documentation spec.
pub(crate) fn build(
    options: &LoginOptions,
    handler: Arc<dyn LoginHandler>,
) -> anyhow::Result<(MethodRouter, OperationSpec)> {
    let schema = login_schema(&options.fields);
    let body_schema = schema.body.clone().unwrap_or(Value::Null);
    let validator = jsonschema::validator_for(&body_schema)
        .map_err(|e| anyhow::anyhow!("login schema failed to compile: {e}"))?;
    let filter = adaptor::method_filter(&options.method)
        .ok_or_else(|| anyhow::anyhow!("unsupported login method {}", options.method))?;

    let spec = OperationSpec {
        method: options.method.clone(),
        path: options.path.clone(),
        operation_id: "login".to_string(),
        schema,
    };

    let validator = Arc::new(validator);
    let route = on(filter, move |request: Request| {
        handle(handler.clone(), validator.clone(), request)
    });

    Ok((route, spec))
}

async fn handle(
    handler: Arc<dyn LoginHandler>,
    validator: Arc<jsonschema::Validator>,
    request: Request,
) -> axum::response::Response {
    let body = match read_body(request).await {
        Ok(body) => body,
        Err(rejection) => return rejection.into_response(),
    };

    let errors: Vec<Value> = validator
        .iter_errors(&body)
        .map(|err| json!({ "detail": err.to_string(), "pointer": err.instance_path.to_string() }))
        .collect();
    if !errors.is_empty() {
        return HttpError::bad_request("")
            .with_body(json!({ "message": "Invalid request body", "errors": errors }))
            .into_response();
    }

    match handler.login(body).await {
        Ok(reply) if !reply.body.is_null() => reply.into_response(),
        Ok(_) => {
            tracing::error!("login handler returned an empty response");
            HttpError::unauthorized("Login failed").into_response()
        }
        Err(error) => {
            tracing::error!(%error, "login failed");
            HttpError::unauthorized("Login failed").into_response()
        }
    }
}

async fn read_body(request: Request) -> Result<Value, HttpError> {
    let bytes = axum::body::to_bytes(request.into_body(), crate::adaptor::BODY_LIMIT)
        .await
        .map_err(|_| HttpError::bad_request("Request body unreadable"))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| HttpError::bad_request("Request body is not valid JSON"))
}

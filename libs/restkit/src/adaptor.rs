//! Handler adaptation.
//!
//! Wraps one resource operation as an axum handler: authentication check,
//! request validation against the route's compiled schemas, envelope
//! construction, a single operation invocation, and uniform error
//! translation. Operation failures never reach the framework's fallback
//! handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{RawPathParams, Request},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{on, MethodFilter, MethodRouter},
};
use serde_json::{json, Map, Value};

use crate::auth::Guard;
use crate::endpoint::Binding;
use crate::envelope::{JsonReply, RequestEnvelope};
use crate::error::{HttpError, OpError};
use crate::list::ListAdaptor;
use crate::resource::{OperationKind, Resource};
use crate::schema::OperationSchema;

/// Maximum request body size read by route handlers.
pub(crate) const BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Validators compiled once per route from the projected schemas.
pub(crate) struct CompiledSchemas {
    body: Option<jsonschema::Validator>,
    query: Option<jsonschema::Validator>,
    params: Option<jsonschema::Validator>,
}

impl CompiledSchemas {
    pub(crate) fn compile(schema: &OperationSchema) -> anyhow::Result<Self> {
        let build = |slot: &Option<Value>| -> anyhow::Result<Option<jsonschema::Validator>> {
            match slot {
                Some(s) => Ok(Some(
                    jsonschema::validator_for(s)
                        .map_err(|e| anyhow::anyhow!("schema failed to compile: {e}"))?,
                )),
                None => Ok(None),
            }
        };
        Ok(Self {
            body: build(&schema.body)?,
            query: build(&schema.query)?,
            params: build(&schema.params)?,
        })
    }
}

/// Everything one registered route needs at request time.
pub(crate) struct RouteSpec {
    pub resource: Arc<dyn Resource>,
    pub binding: Binding,
    pub guard: Option<Arc<dyn Guard>>,
    pub list_adaptor: Option<Arc<dyn ListAdaptor>>,
    pub schemas: CompiledSchemas,
    pub method: Method,
    pub path: String,
}

/// Routable subset of HTTP methods; anything else is skipped by the engine.
pub(crate) fn method_filter(method: &Method) -> Option<MethodFilter> {
    match method.as_str() {
        "GET" => Some(MethodFilter::GET),
        "POST" => Some(MethodFilter::POST),
        "PUT" => Some(MethodFilter::PUT),
        "PATCH" => Some(MethodFilter::PATCH),
        "DELETE" => Some(MethodFilter::DELETE),
        "HEAD" => Some(MethodFilter::HEAD),
        _ => None,
    }
}

/// Build the axum method router for one route.
///
/// Unsupported HTTP methods yield `None` and the route is skipped by the
/// engine (with an error log), matching the first-wins registration policy.
pub(crate) fn method_router(spec: Arc<RouteSpec>) -> Option<MethodRouter> {
    let filter = method_filter(&spec.method)?;
    Some(on(filter, move |params: RawPathParams, request: Request| {
        handle(spec.clone(), params, request)
    }))
}

async fn handle(spec: Arc<RouteSpec>, raw_params: RawPathParams, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    // Authentication first; the handler never runs after a rejection.
    let actor = match &spec.guard {
        Some(guard) => match guard.check(&parts).await {
            Ok(actor) => Some(actor),
            Err(rejection) => return rejection.into_response(),
        },
        None => None,
    };

    let params: HashMap<String, String> = raw_params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let query: HashMap<String, String> = parts
        .uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    if let Err(resp) = validate(&spec.schemas.params, &params, "path parameters") {
        return resp;
    }
    if let Err(resp) = validate(&spec.schemas.query, &query, "query parameters") {
        return resp;
    }

    let body = match read_json_body(body).await {
        Ok(body) => body,
        Err(rejection) => return rejection.into_response(),
    };
    if let Some(validator) = &spec.schemas.body {
        let instance = body.clone().unwrap_or(Value::Null);
        if let Err(resp) = run_validator(validator, &instance, "request body") {
            return resp;
        }
    }

    let envelope = RequestEnvelope {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        query,
        params,
        body,
        headers: parts.headers.clone(),
        actor,
    };

    match invoke(&spec, envelope).await {
        Ok(reply) => reply.into_response(),
        Err(err) => {
            tracing::error!(
                method = %spec.method,
                path = %spec.path,
                error = %err,
                "resource operation failed"
            );
            err.into_response()
        }
    }
}

/// Invoke the bound operation exactly once.
async fn invoke(spec: &RouteSpec, envelope: RequestEnvelope) -> Result<JsonReply, OpError> {
    let kind = match &spec.binding {
        Binding::Custom(handler) => return handler.call(envelope).await,
        Binding::Operation(kind) => *kind,
    };

    let resource = &spec.resource;
    let actor = envelope.actor.clone();
    let body = || envelope.body.clone().unwrap_or(Value::Null);
    let id = |envelope: &RequestEnvelope| -> Result<String, OpError> {
        envelope
            .param("id")
            .map(str::to_string)
            .ok_or_else(|| HttpError::internal().into())
    };

    let result = match kind {
        OperationKind::Create => resource.create(actor, body()).await?,
        OperationKind::Get => resource.get(actor, &id(&envelope)?).await?,
        OperationKind::Update => resource.update(actor, &id(&envelope)?, body()).await?,
        OperationKind::Replace => resource.replace(actor, &id(&envelope)?, body()).await?,
        OperationKind::Delete => resource.delete(actor, &id(&envelope)?).await?,
        OperationKind::List => {
            let adaptor = spec.list_adaptor.as_ref().ok_or_else(|| {
                HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, "List adaptor not configured")
            })?;
            let parsed = adaptor.parse(resource.name(), &envelope.query)?;
            let result = resource.list(actor, parsed.clone()).await?;
            return Ok(adaptor.shape(result, &parsed, resource.name()));
        }
    };

    Ok(JsonReply::ok(result))
}

async fn read_json_body(body: axum::body::Body) -> Result<Option<Value>, HttpError> {
    let bytes = axum::body::to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|_| HttpError::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large"))?;
    if bytes.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|_| HttpError::bad_request("Request body is not valid JSON"))
}

fn validate(
    validator: &Option<jsonschema::Validator>,
    values: &HashMap<String, String>,
    what: &str,
) -> Result<(), Response> {
    let Some(validator) = validator else {
        return Ok(());
    };
    let mut instance = Map::new();
    for (k, v) in values {
        instance.insert(k.clone(), Value::String(v.clone()));
    }
    run_validator(validator, &Value::Object(instance), what)
}

fn run_validator(
    validator: &jsonschema::Validator,
    instance: &Value,
    what: &str,
) -> Result<(), Response> {
    let errors: Vec<Value> = validator
        .iter_errors(instance)
        .map(|err| {
            json!({
                "detail": err.to_string(),
                "pointer": err.instance_path.to_string(),
            })
        })
        .collect();
    if errors.is_empty() {
        return Ok(());
    }
    tracing::debug!(what, violations = errors.len(), "request validation failed");
    let body = json!({
        "message": format!("Invalid {what}"),
        "errors": errors,
    });
    Err(HttpError::bad_request("").with_body(body).into_response())
}

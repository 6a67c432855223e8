//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use serde_json::{json, Value};

use restkit::error::{HttpError, OpError};
use restkit::{Actor, JsonReply, ListAdaptor, OperationKind, Resource, ResourceSchema};

/// In-memory books resource recording the calls it receives.
pub struct BooksResource {
    schema: ResourceSchema,
    pub calls: Mutex<Vec<String>>,
    routes: Vec<OperationKind>,
}

impl BooksResource {
    pub fn new(routes: Vec<OperationKind>) -> Arc<Self> {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), json!({ "type": "string" }));
        fields.insert("pages".to_string(), json!({ "type": "integer" }));
        Arc::new(Self {
            schema: ResourceSchema::uniform(fields, vec!["title".to_string()]),
            calls: Mutex::new(Vec::new()),
            routes,
        })
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn recorded(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Resource for BooksResource {
    fn name(&self) -> &str {
        "books"
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn routes(&self) -> Vec<OperationKind> {
        self.routes.clone()
    }

    async fn create(&self, actor: Option<Actor>, body: Value) -> Result<Value, OpError> {
        self.record(format!(
            "create:{}",
            actor.map(|a| a.id).unwrap_or_else(|| "-".to_string())
        ));
        Ok(json!({ "title": body["title"], "pages": body["pages"] }))
    }

    async fn get(&self, _actor: Option<Actor>, id: &str) -> Result<Value, OpError> {
        self.record(format!("get:{id}"));
        Ok(json!({ "title": "The Histories", "pages": 544 }))
    }

    async fn update(
        &self,
        _actor: Option<Actor>,
        id: &str,
        body: Value,
    ) -> Result<Value, OpError> {
        self.record(format!("update:{id}"));
        Ok(json!({ "title": body["title"], "pages": 1 }))
    }

    async fn delete(&self, _actor: Option<Actor>, id: &str) -> Result<Value, OpError> {
        self.record(format!("delete:{id}"));
        Ok(json!({}))
    }

    async fn list(&self, _actor: Option<Actor>, params: Value) -> Result<Value, OpError> {
        self.record(format!("list:{params}"));
        Ok(json!({ "items": [{ "title": "The Histories", "pages": 544 }], "total": 1 }))
    }
}

/// Resource whose operations fail in the two interesting ways.
pub struct HauntedResource {
    schema: ResourceSchema,
}

impl HauntedResource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            schema: ResourceSchema::default(),
        })
    }
}

#[async_trait]
impl Resource for HauntedResource {
    fn name(&self) -> &str {
        "ghosts"
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn routes(&self) -> Vec<OperationKind> {
        vec![OperationKind::Get, OperationKind::Delete]
    }

    async fn get(&self, _actor: Option<Actor>, _id: &str) -> Result<Value, OpError> {
        // Carries no HTTP shaping at all.
        Err(anyhow::anyhow!("the spirit realm is unreachable").into())
    }

    async fn delete(&self, _actor: Option<Actor>, _id: &str) -> Result<Value, OpError> {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("x-haunting", "active".parse().unwrap());
        Err(HttpError::conflict("Ghost refuses to leave")
            .with_headers(headers)
            .into())
    }
}

/// Minimal paging adaptor shaping `{items, total}` results.
pub struct TestAdaptor;

impl ListAdaptor for TestAdaptor {
    fn params(&self) -> Vec<String> {
        vec!["limit".to_string(), "offset".to_string()]
    }

    fn parse(&self, _resource_name: &str, raw: &HashMap<String, String>) -> Result<Value, HttpError> {
        let limit = match raw.get("limit") {
            None => 10,
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| HttpError::bad_request("Invalid limit parameter"))?,
        };
        Ok(json!({ "limit": limit }))
    }

    fn shape(&self, result: Value, _parsed: &Value, _resource_name: &str) -> JsonReply {
        let total = result["total"].as_u64().unwrap_or(0);
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("x-total-count", total.to_string().parse().unwrap());
        JsonReply::ok(result["items"].clone()).with_headers(headers)
    }
}

pub async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

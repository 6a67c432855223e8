//! In-memory widgets resource.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::{json, Value};
use uuid::Uuid;

use restkit::error::{HttpError, OpError};
use restkit::{Actor, OperationKind, Resource, ResourceSchema};

pub struct WidgetsResource {
    schema: ResourceSchema,
    store: DashMap<String, Value>,
}

impl WidgetsResource {
    pub fn new() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), json!({ "type": "string" }));
        fields.insert("color".to_string(), json!({ "type": "string" }));
        fields.insert("qty".to_string(), json!({ "type": "integer" }));

        let mut view = fields.clone();
        view.insert("id".to_string(), json!({ "type": "string" }));
        view.insert(
            "created_at".to_string(),
            json!({ "type": "string", "format": "date-time" }),
        );

        Self {
            schema: ResourceSchema {
                create: fields.clone(),
                update: fields.clone(),
                replace: fields,
                view,
                required: vec!["name".to_string()],
            },
            store: DashMap::new(),
        }
    }

    fn fetch(&self, id: &str) -> Result<Value, OpError> {
        self.store
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| HttpError::not_found("Widget not found").into())
    }
}

#[async_trait]
impl Resource for WidgetsResource {
    fn name(&self) -> &str {
        "widgets"
    }

    fn permission_name(&self) -> &str {
        "inventory.widgets"
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    fn routes(&self) -> Vec<OperationKind> {
        vec![
            OperationKind::Create,
            OperationKind::Get,
            OperationKind::Update,
            OperationKind::Replace,
            OperationKind::Delete,
            OperationKind::List,
        ]
    }

    async fn create(&self, _actor: Option<Actor>, body: Value) -> Result<Value, OpError> {
        let id = Uuid::new_v4().to_string();
        let mut record = body.as_object().cloned().unwrap_or_default();
        record.insert("id".to_string(), json!(id));
        record.insert("created_at".to_string(), json!(Utc::now().to_rfc3339()));
        let record = Value::Object(record);
        self.store.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, _actor: Option<Actor>, id: &str) -> Result<Value, OpError> {
        self.fetch(id)
    }

    async fn update(
        &self,
        _actor: Option<Actor>,
        id: &str,
        body: Value,
    ) -> Result<Value, OpError> {
        let existing = self.fetch(id)?;
        let mut record = existing.as_object().cloned().unwrap_or_default();
        if let Some(patch) = body.as_object() {
            for (k, v) in patch {
                record.insert(k.clone(), v.clone());
            }
        }
        let record = Value::Object(record);
        self.store.insert(id.to_string(), record.clone());
        Ok(record)
    }

    async fn replace(
        &self,
        _actor: Option<Actor>,
        id: &str,
        body: Value,
    ) -> Result<Value, OpError> {
        let existing = self.fetch(id)?;
        let mut record = body.as_object().cloned().unwrap_or_default();
        record.insert("id".to_string(), json!(id));
        if let Some(created) = existing.get("created_at") {
            record.insert("created_at".to_string(), created.clone());
        }
        let record = Value::Object(record);
        self.store.insert(id.to_string(), record.clone());
        Ok(record)
    }

    async fn delete(&self, _actor: Option<Actor>, id: &str) -> Result<Value, OpError> {
        self.store
            .remove(id)
            .map(|(_, record)| record)
            .ok_or_else(|| HttpError::not_found("Widget not found").into())
    }

    async fn list(&self, _actor: Option<Actor>, params: Value) -> Result<Value, OpError> {
        let offset = params["offset"].as_u64().unwrap_or(0) as usize;
        let limit = params["limit"].as_u64().unwrap_or(50) as usize;

        let mut items: Vec<Value> = self
            .store
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| {
            a["created_at"]
                .as_str()
                .unwrap_or("")
                .cmp(b["created_at"].as_str().unwrap_or(""))
        });

        let total = items.len();
        let page: Vec<Value> = items.into_iter().skip(offset).take(limit).collect();
        Ok(json!({ "items": page, "total": total }))
    }
}

/// Paging adaptor: `limit`/`offset` query parameters, page body, total in
/// the `x-total-count` header.
pub struct PagingAdaptor;

impl restkit::ListAdaptor for PagingAdaptor {
    fn params(&self) -> Vec<String> {
        vec!["limit".to_string(), "offset".to_string()]
    }

    fn parse(
        &self,
        _resource_name: &str,
        raw: &std::collections::HashMap<String, String>,
    ) -> Result<Value, HttpError> {
        let number = |key: &str, default: u64| -> Result<u64, HttpError> {
            match raw.get(key) {
                None => Ok(default),
                Some(v) => v
                    .parse::<u64>()
                    .map_err(|_| HttpError::bad_request(format!("Invalid {key} parameter"))),
            }
        };
        Ok(json!({
            "limit": number("limit", 50)?.min(200),
            "offset": number("offset", 0)?,
        }))
    }

    fn shape(&self, result: Value, _parsed: &Value, _resource_name: &str) -> restkit::JsonReply {
        let total = result["total"].as_u64().unwrap_or(0);
        let body = result
            .get("items")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));

        let mut headers = axum::http::HeaderMap::new();
        if let Ok(value) = total.to_string().parse() {
            headers.insert("x-total-count", value);
        }
        restkit::JsonReply::ok(body).with_headers(headers)
    }
}

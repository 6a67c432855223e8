//! OpenAPI document generation.
//!
//! The gate collects one [`OperationSpec`] per registered route while
//! mounting and emits a single OpenAPI 3.0.3 document built from the same
//! schema projections that drive request validation. The document is built
//! once and served as static JSON.

use std::collections::BTreeMap;

use axum::response::Html;
use http::Method;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use crate::schema::OperationSchema;

/// One registered route, as recorded for documentation.
#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub method: Method,
    pub path: String,
    pub operation_id: String,
    pub schema: OperationSchema,
}

/// Document metadata; see the gate's docs configuration.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub description: String,
    pub version: String,
}

/// Collects operation specs during mounting.
#[derive(Default)]
pub struct OpenApiRegistry {
    operations: Mutex<Vec<OperationSpec>>,
}

impl OpenApiRegistry {
    pub fn register_operation(&self, spec: OperationSpec) {
        self.operations.lock().push(spec);
    }

    pub fn operation_count(&self) -> usize {
        self.operations.lock().len()
    }

    pub fn operations(&self) -> Vec<OperationSpec> {
        self.operations.lock().clone()
    }

    /// Build the OpenAPI document from the registered operations.
    pub fn build_openapi(&self, info: &DocumentInfo) -> Value {
        let operations = self.operations.lock();
        tracing::info!(
            operations = operations.len(),
            "building OpenAPI document"
        );

        let mut paths_map: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
        for spec in operations.iter() {
            let method = spec.method.as_str().to_lowercase();
            let entry = paths_map.entry(spec.path.clone()).or_default();
            entry.insert(method, operation_object(spec));
        }

        json!({
            "openapi": "3.0.3",
            "info": {
                "title": info.title,
                "description": info.description,
                "version": info.version,
            },
            "paths": paths_map,
        })
    }
}

fn operation_object(spec: &OperationSpec) -> Value {
    let mut operation = Map::new();
    operation.insert("operationId".to_string(), json!(spec.operation_id));

    let schema = &spec.schema;
    if !schema.summary.is_empty() {
        operation.insert("summary".to_string(), json!(schema.summary));
    }
    if !schema.description.is_empty() {
        operation.insert("description".to_string(), json!(schema.description));
    }
    if !schema.tags.is_empty() {
        operation.insert("tags".to_string(), json!(schema.tags));
    }

    let mut parameters = Vec::new();
    if let Some(params) = &schema.params {
        parameters.extend(parameter_objects(params, "path", true));
    }
    if let Some(query) = &schema.query {
        parameters.extend(parameter_objects(query, "query", false));
    }
    if !parameters.is_empty() {
        operation.insert("parameters".to_string(), Value::Array(parameters));
    }

    if let Some(body) = &schema.body {
        operation.insert(
            "requestBody".to_string(),
            json!({
                "required": true,
                "content": { "application/json": { "schema": body } },
            }),
        );
    }

    let response = match &schema.response {
        Some(s) => json!({
            "description": "Successful response",
            "content": { "application/json": { "schema": s } },
        }),
        None => json!({ "description": "Successful response" }),
    };
    operation.insert("responses".to_string(), json!({ "200": response }));

    Value::Object(operation)
}

/// Flatten an object schema into OpenAPI parameter objects.
///
/// Path parameters are always required; query parameters follow the
/// schema's `required` list.
fn parameter_objects(object_schema: &Value, location: &str, force_required: bool) -> Vec<Value> {
    let Some(props) = object_schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    let required: Vec<&str> = object_schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    props
        .iter()
        .map(|(name, schema)| {
            json!({
                "name": name,
                "in": location,
                "required": force_required || required.contains(&name.as_str()),
                "schema": schema,
            })
        })
        .collect()
}

/// Interactive documentation page pointing at the served JSON document.
pub fn docs_page(spec_url: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>API Docs</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="{spec_url}" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#
    ))
}

//! Schema projection.
//!
//! Converts a resource's field-schema subsets into the JSON-schema fragments
//! used for request validation and OpenAPI documentation. Projection is a
//! pure function of its inputs: the same resource and operation kind always
//! yield structurally identical fragments.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::resource::{OperationKind, ResourceSchema};

/// The validation/documentation contract of one route.
///
/// The four schema slots mirror the request surface: path params, query
/// string, request body and the 200 response. `None` means the slot is
/// unconstrained and undocumented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationSchema {
    pub summary: String,
    pub description: String,
    pub tags: Vec<String>,
    pub params: Option<Value>,
    pub query: Option<Value>,
    pub body: Option<Value>,
    pub response: Option<Value>,
}

fn properties(fields: &BTreeMap<String, Value>) -> Value {
    let mut props = Map::new();
    for (name, descriptor) in fields {
        props.insert(name.clone(), descriptor.clone());
    }
    Value::Object(props)
}

/// Strict object schema: declared fields only, unknown fields rejected.
fn strict_object(fields: &BTreeMap<String, Value>, required: &[String]) -> Value {
    let mut obj = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": properties(fields),
    });
    if !required.is_empty() {
        obj["required"] = json!(required);
    }
    obj
}

/// Params schema for entity-scoped routes: a single required string `id`.
fn id_params() -> Value {
    params_schema(&["id".to_string()])
}

/// Params schema typing each named path parameter as a required string.
pub fn params_schema(names: &[String]) -> Value {
    let mut props = Map::new();
    for name in names {
        props.insert(name.clone(), json!({ "type": "string" }));
    }
    json!({
        "type": "object",
        "properties": Value::Object(props),
        "required": names,
    })
}

/// Query schema for list routes: each declared parameter typed as a string,
/// unknown parameters tolerated.
fn list_query(param_names: &[String]) -> Value {
    let mut props = Map::new();
    for name in param_names {
        props.insert(name.clone(), json!({ "type": "string" }));
    }
    json!({
        "type": "object",
        "properties": Value::Object(props),
    })
}

/// Project the schema fragment for one CRUD operation of a resource.
///
/// `list_params` supplies the accepted query-parameter names for
/// [`OperationKind::List`]; it is ignored for every other kind.
pub fn project(
    name: &str,
    permission_name: &str,
    schema: &ResourceSchema,
    kind: OperationKind,
    list_params: &[String],
) -> OperationSchema {
    let view = strict_object(&schema.view, &[]);
    let doc = |summary: String| OperationSchema {
        description: format!("{summary} (permission {permission_name}.{})", kind.action()),
        summary,
        tags: vec![name.to_string()],
        ..OperationSchema::default()
    };

    match kind {
        OperationKind::Create => OperationSchema {
            body: Some(strict_object(&schema.create, &schema.required)),
            response: Some(view),
            ..doc(format!("Create {name}"))
        },
        OperationKind::Get => OperationSchema {
            params: Some(id_params()),
            response: Some(view),
            ..doc(format!("Get {name} by ID"))
        },
        OperationKind::Update => OperationSchema {
            params: Some(id_params()),
            body: Some(strict_object(&schema.update, &[])),
            response: Some(view),
            ..doc(format!("Patch {name} by ID"))
        },
        OperationKind::Replace => OperationSchema {
            params: Some(id_params()),
            body: Some(strict_object(&schema.replace, &schema.required)),
            response: Some(view),
            ..doc(format!("Replace {name} by ID"))
        },
        OperationKind::Delete => OperationSchema {
            params: Some(id_params()),
            response: Some(json!({ "type": "object" })),
            ..doc(format!("Delete {name} by ID"))
        },
        OperationKind::List => OperationSchema {
            query: Some(list_query(list_params)),
            response: Some(json!({ "type": "array", "items": view })),
            ..doc(format!("List {name}"))
        },
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde_json::Value;

use crate::actor::Actor;
use crate::endpoint::EndpointDef;
use crate::error::{HttpError, OpError};
use crate::list::ListAdaptor;

/// Field subsets a resource exposes per operation kind, plus the list of
/// fields that are mandatory on create/replace.
///
/// Each field maps to a primitive JSON-schema descriptor, e.g.
/// `json!({"type": "string"})`. The projector wraps these subsets into the
/// full request/response schemas; see [`crate::schema`].
#[derive(Debug, Clone, Default)]
pub struct ResourceSchema {
    pub create: BTreeMap<String, Value>,
    pub update: BTreeMap<String, Value>,
    pub replace: BTreeMap<String, Value>,
    pub view: BTreeMap<String, Value>,
    pub required: Vec<String>,
}

impl ResourceSchema {
    /// Convenience constructor for resources whose create/update/replace/view
    /// subsets are all the same field set.
    pub fn uniform(fields: BTreeMap<String, Value>, required: Vec<String>) -> Self {
        Self {
            create: fields.clone(),
            update: fields.clone(),
            replace: fields.clone(),
            view: fields,
            required,
        }
    }
}

/// The fixed CRUD operation set a resource can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Get,
    Update,
    Replace,
    Delete,
    List,
}

impl OperationKind {
    /// Action name used in operation ids and generated documentation.
    pub fn action(self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Get => "get",
            OperationKind::Update => "update",
            OperationKind::Replace => "replace",
            OperationKind::Delete => "delete",
            OperationKind::List => "list",
        }
    }

    /// Whether this operation addresses a single entity by id.
    pub fn entity_scoped(self) -> bool {
        matches!(
            self,
            OperationKind::Get
                | OperationKind::Update
                | OperationKind::Replace
                | OperationKind::Delete
        )
    }
}

/// Per-resource HTTP verb overrides for the fixed CRUD set.
#[derive(Debug, Clone)]
pub struct MethodsMapping {
    pub create: Method,
    pub get: Method,
    pub update: Method,
    pub replace: Method,
    pub delete: Method,
    pub list: Method,
}

impl Default for MethodsMapping {
    fn default() -> Self {
        Self {
            create: Method::POST,
            get: Method::GET,
            update: Method::PATCH,
            replace: Method::PUT,
            delete: Method::DELETE,
            list: Method::GET,
        }
    }
}

impl MethodsMapping {
    pub fn verb(&self, kind: OperationKind) -> Method {
        match kind {
            OperationKind::Create => self.create.clone(),
            OperationKind::Get => self.get.clone(),
            OperationKind::Update => self.update.clone(),
            OperationKind::Replace => self.replace.clone(),
            OperationKind::Delete => self.delete.clone(),
            OperationKind::List => self.list.clone(),
        }
    }
}

fn unsupported(op: &str) -> OpError {
    HttpError::new(
        StatusCode::NOT_IMPLEMENTED,
        format!("Operation {op} is not implemented"),
    )
    .into()
}

/// External provider of CRUD-like operations plus a field schema.
///
/// The routing engine never runs business logic itself; it derives routes
/// from this contract and forwards validated, authenticated requests to it.
/// Operations default to `501 Not Implemented` so a resource only has to
/// implement what it declares in [`Resource::routes`].
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource name; used to derive the default route path and docs tags.
    fn name(&self) -> &str;

    /// Permission namespace used in generated documentation.
    fn permission_name(&self) -> &str {
        self.name()
    }

    fn schema(&self) -> &ResourceSchema;

    /// Operations exposed by the fixed CRUD endpoint source.
    fn routes(&self) -> Vec<OperationKind> {
        vec![
            OperationKind::Create,
            OperationKind::Get,
            OperationKind::Update,
            OperationKind::List,
        ]
    }

    /// HTTP verbs for the fixed CRUD set.
    fn methods(&self) -> MethodsMapping {
        MethodsMapping::default()
    }

    /// Declarative endpoint source. A resource returning `Some` enumerates
    /// its endpoints itself and [`Resource::routes`] is ignored.
    fn endpoints(&self, _list_adaptor: Option<&Arc<dyn ListAdaptor>>) -> Option<Vec<EndpointDef>> {
        None
    }

    async fn create(&self, _actor: Option<Actor>, _body: Value) -> Result<Value, OpError> {
        Err(unsupported("create"))
    }

    async fn get(&self, _actor: Option<Actor>, _id: &str) -> Result<Value, OpError> {
        Err(unsupported("get"))
    }

    async fn update(
        &self,
        _actor: Option<Actor>,
        _id: &str,
        _body: Value,
    ) -> Result<Value, OpError> {
        Err(unsupported("update"))
    }

    async fn replace(
        &self,
        _actor: Option<Actor>,
        _id: &str,
        _body: Value,
    ) -> Result<Value, OpError> {
        Err(unsupported("replace"))
    }

    async fn delete(&self, _actor: Option<Actor>, _id: &str) -> Result<Value, OpError> {
        Err(unsupported("delete"))
    }

    async fn list(&self, _actor: Option<Actor>, _params: Value) -> Result<Value, OpError> {
        Err(unsupported("list"))
    }
}

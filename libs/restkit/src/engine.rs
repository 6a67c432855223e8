//! Route mapping engine.
//!
//! Expands declared resources into concrete routes: for every enumerated
//! endpoint it resolves the final path, projects or adopts the schema,
//! resolves authentication, compiles validators and registers the adapted
//! handler on the router plus an operation spec in the OpenAPI registry.

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::Method;
use axum::Router;

use crate::adaptor::{self, CompiledSchemas, RouteSpec};
use crate::auth::{AuthRef, GuardRegistry};
use crate::endpoint::{enumerate, Binding, EndpointDef};
use crate::list::ListAdaptor;
use crate::openapi::{OpenApiRegistry, OperationSpec};
use crate::path;
use crate::resource::{OperationKind, Resource};
use crate::schema;

/// Declaration of one routable resource.
///
/// `path` overrides the `prefix`-derived base path entirely. Settings left
/// unset inherit from the mount defaults.
#[derive(Clone)]
pub struct ResourceDef {
    pub resource: Arc<dyn Resource>,
    pub prefix: Option<String>,
    pub path: Option<String>,
    pub list_adaptor: Option<Arc<dyn ListAdaptor>>,
    pub auth: Option<AuthRef>,
}

impl ResourceDef {
    pub fn new(resource: Arc<dyn Resource>) -> Self {
        Self {
            resource,
            prefix: None,
            path: None,
            list_adaptor: None,
            auth: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_list_adaptor(mut self, adaptor: Arc<dyn ListAdaptor>) -> Self {
        self.list_adaptor = Some(adaptor);
        self
    }

    pub fn with_auth(mut self, auth: AuthRef) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// Mount-level defaults applied to every resource that does not override
/// them. Endpoint-level settings win over resource-level, which win here.
#[derive(Clone, Default)]
pub struct MountDefaults {
    pub prefix: Option<String>,
    pub list_adaptor: Option<Arc<dyn ListAdaptor>>,
    pub auth: Option<AuthRef>,
}

impl MountDefaults {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_list_adaptor(mut self, adaptor: Arc<dyn ListAdaptor>) -> Self {
        self.list_adaptor = Some(adaptor);
        self
    }

    pub fn with_auth(mut self, auth: AuthRef) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// Register every resource's routes on the router, in declaration order.
pub(crate) fn mount_resources(
    mut router: Router,
    registry: &OpenApiRegistry,
    guards: &GuardRegistry,
    seen: &mut HashSet<(Method, String)>,
    defaults: &MountDefaults,
    defs: &[ResourceDef],
) -> anyhow::Result<Router> {
    for def in defs {
        router = mount_one(router, registry, guards, seen, defaults, def)?;
    }
    Ok(router)
}

fn mount_one(
    mut router: Router,
    registry: &OpenApiRegistry,
    guards: &GuardRegistry,
    seen: &mut HashSet<(Method, String)>,
    defaults: &MountDefaults,
    def: &ResourceDef,
) -> anyhow::Result<Router> {
    let resource = def.resource.clone();
    let name = resource.name().to_string();

    let prefix = def.prefix.clone().or_else(|| defaults.prefix.clone());
    let list_adaptor = def
        .list_adaptor
        .clone()
        .or_else(|| defaults.list_adaptor.clone());
    let resource_auth = def.auth.clone().or_else(|| defaults.auth.clone());

    let base = path::base_path(def.path.as_deref(), prefix.as_deref(), &name);

    for endpoint in enumerate(resource.as_ref(), list_adaptor.as_ref()) {
        // Listing is opt-in: without an adaptor the list route is skipped.
        if matches!(endpoint.binding, Binding::Operation(OperationKind::List))
            && list_adaptor.is_none()
        {
            tracing::debug!(resource = %name, "list route skipped: no list adaptor configured");
            continue;
        }

        let route_path = path::endpoint_path(&base, &endpoint.rel_path);
        let route_key = (endpoint.method.clone(), route_path.clone());
        if seen.contains(&route_key) {
            tracing::error!(
                method = %endpoint.method,
                path = %route_path,
                "duplicate route; keeping the first registration"
            );
            continue;
        }

        let mut op_schema = endpoint.schema.clone().unwrap_or_else(|| {
            projected_schema(resource.as_ref(), &endpoint, list_adaptor.as_deref())
        });

        // Path parameters without an explicit schema derive one from the
        // path itself: every `{name}` segment becomes a required string.
        if op_schema.params.is_none() {
            let names = path::scan_path_params(&route_path);
            if !names.is_empty() {
                op_schema.params = Some(schema::params_schema(&names));
            }
        }

        let guard = guards.resolve(
            endpoint
                .auth
                .as_ref()
                .or(resource_auth.as_ref())
                .unwrap_or(&AuthRef::None),
        );

        let spec = Arc::new(RouteSpec {
            resource: resource.clone(),
            binding: endpoint.binding.clone(),
            guard,
            list_adaptor: list_adaptor.clone(),
            schemas: CompiledSchemas::compile(&op_schema)?,
            method: endpoint.method.clone(),
            path: route_path.clone(),
        });

        let Some(method_router) = adaptor::method_router(spec) else {
            tracing::error!(
                method = %endpoint.method,
                path = %route_path,
                "unsupported HTTP method; route skipped"
            );
            continue;
        };

        tracing::debug!(method = %endpoint.method, path = %route_path, "registered route");
        router = router.route(&route_path, method_router);
        seen.insert(route_key);
        registry.register_operation(OperationSpec {
            method: endpoint.method.clone(),
            path: route_path,
            operation_id: format!("{name}:{}", endpoint.action),
            schema: op_schema,
        });
    }

    Ok(router)
}

/// Schema fallback for endpoints without an explicit one: CRUD bindings
/// project from the resource's field schema; custom bindings stay
/// unconstrained apart from docs strings.
fn projected_schema(
    resource: &dyn Resource,
    endpoint: &EndpointDef,
    list_adaptor: Option<&dyn ListAdaptor>,
) -> schema::OperationSchema {
    match &endpoint.binding {
        Binding::Operation(kind) => {
            let list_params = match kind {
                OperationKind::List => list_adaptor.map(|a| a.params()).unwrap_or_default(),
                _ => Vec::new(),
            };
            schema::project(
                resource.name(),
                resource.permission_name(),
                resource.schema(),
                *kind,
                &list_params,
            )
        }
        Binding::Custom(_) => schema::OperationSchema {
            summary: format!("{} {}", endpoint.action, resource.name()),
            tags: vec![resource.name().to_string()],
            ..schema::OperationSchema::default()
        },
    }
}

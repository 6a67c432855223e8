//! The gate: one-stop surface wiring guards, resources, the login route
//! and documentation onto an axum router, plus the serve loop.

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::adaptor::BODY_LIMIT;
use crate::auth::{Guard, GuardRegistry};
use crate::engine::{self, MountDefaults, ResourceDef};
use crate::login::{self, LoginHandler, LoginOptions};
use crate::openapi::{docs_page, DocumentInfo, OpenApiRegistry};

/// Default listen port when neither configuration nor `PORT` supplies one.
pub const DEFAULT_PORT: u16 = 9000;

fn default_docs_path() -> String {
    "/documentations".to_string()
}

fn default_docs_title() -> String {
    "Untitled document".to_string()
}

fn default_docs_version() -> String {
    "0.0.1".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DocsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_docs_path")]
    pub path: String,
    #[serde(default = "default_docs_title")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_docs_version")]
    pub version: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_docs_path(),
            title: default_docs_title(),
            description: None,
            version: default_docs_version(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins; `"*"` anywhere in the list allows any origin.
    pub origins: Vec<String>,
    #[serde(default)]
    pub headers: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    /// Bind host; defaults to `0.0.0.0`.
    #[serde(default)]
    pub host: Option<String>,
    /// Listen port; falls back to the `PORT` environment variable, then
    /// to [`DEFAULT_PORT`].
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    #[serde(default)]
    pub docs: DocsConfig,
}

/// Builder collecting everything that makes up the HTTP surface.
///
/// Named guards must be registered before the resources that reference
/// them are mounted; mounting resolves authentication references against
/// the guards known at that point.
pub struct Gate {
    config: GateConfig,
    router: Router,
    registry: OpenApiRegistry,
    guards: GuardRegistry,
    seen: HashSet<(Method, String)>,
}

impl Gate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            router: Router::new(),
            registry: OpenApiRegistry::default(),
            guards: GuardRegistry::default(),
            seen: HashSet::new(),
        }
    }

    /// Register a named authentication check.
    pub fn guard(mut self, name: impl Into<String>, guard: Arc<dyn Guard>) -> Self {
        self.guards.insert(name, guard);
        self
    }

    /// Expand resource definitions into routes, in declaration order.
    pub fn mount(
        mut self,
        defaults: &MountDefaults,
        resources: Vec<ResourceDef>,
    ) -> anyhow::Result<Self> {
        self.router = engine::mount_resources(
            self.router,
            &self.registry,
            &self.guards,
            &mut self.seen,
            defaults,
            &resources,
        )?;
        Ok(self)
    }

    /// Register the login route.
    pub fn login(
        mut self,
        options: LoginOptions,
        handler: Arc<dyn LoginHandler>,
    ) -> anyhow::Result<Self> {
        let (route, spec) = login::build(&options, handler)?;
        let key = (options.method.clone(), options.path.clone());
        if self.seen.contains(&key) {
            tracing::error!(path = %options.path, "duplicate login route; keeping the first registration");
            return Ok(self);
        }
        self.router = self.router.route(&options.path, route);
        self.seen.insert(key);
        self.registry.register_operation(spec);
        Ok(self)
    }

    pub fn registry(&self) -> &OpenApiRegistry {
        &self.registry
    }

    /// Finalize the router: documentation routes, health check and the
    /// middleware stack.
    pub fn into_router(self) -> Router {
        let mut router = self.router.route("/healthz", get(|| async { "ok" }));

        if self.config.docs.enabled {
            let docs = &self.config.docs;
            let info = DocumentInfo {
                title: docs.title.clone(),
                description: docs.description.clone().unwrap_or_else(|| docs.title.clone()),
                version: docs.version.clone(),
            };
            // Built once, served as static JSON.
            let document = Arc::new(self.registry.build_openapi(&info));
            let base = crate::path::trim_trailing_slashes(&docs.path).to_string();
            let spec_path = format!("{base}/openapi.json");

            let page = docs_page(&spec_path);
            router = router
                .route(&base, get(move || async move { page.clone() }))
                .route(
                    &spec_path,
                    get(move || async move {
                        let json = Json((*document).clone());
                        ([(header::CACHE_CONTROL, "no-store")], json).into_response()
                    }),
                );
        }

        router = router.layer(RequestBodyLimitLayer::new(BODY_LIMIT));
        if let Some(cors) = &self.config.cors {
            router = router.layer(cors_layer(cors));
        }
        router.layer(TraceLayer::new_for_http())
    }

    /// Bind and serve until the token is cancelled.
    pub async fn serve(self, cancel: CancellationToken) -> anyhow::Result<()> {
        let host = self
            .config
            .host
            .clone()
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match self.config.port {
            Some(port) => port,
            None => std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        };

        let router = self.into_router();
        let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
        tracing::info!("HTTP server bound on {}", listener.local_addr()?);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new().allow_methods([
        Method::GET,
        Method::PUT,
        Method::POST,
        Method::DELETE,
        Method::PATCH,
    ]);

    if config.origins.iter().any(|o| o == "*") {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "invalid CORS origin ignored");
                    None
                }
            })
            .collect();
        layer = layer.allow_origin(AllowOrigin::list(origins));
    }

    let headers: Vec<HeaderName> = config
        .headers
        .iter()
        .filter_map(|h| h.parse::<HeaderName>().ok())
        .collect();
    if !headers.is_empty() {
        layer = layer.allow_headers(headers);
    }

    layer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docs_config_defaults() {
        let docs = DocsConfig::default();
        assert!(docs.enabled);
        assert_eq!(docs.path, "/documentations");
        assert_eq!(docs.version, "0.0.1");
    }

    #[test]
    fn gate_config_parses_from_partial_yaml_value() {
        let cfg: GateConfig = serde_json::from_value(serde_json::json!({
            "port": 9100,
            "cors": { "origins": ["https://app.example.com"] }
        }))
        .unwrap();
        assert_eq!(cfg.port, Some(9100));
        assert!(cfg.docs.enabled);
        assert_eq!(cfg.cors.unwrap().origins.len(), 1);
    }
}

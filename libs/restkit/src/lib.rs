//! # restkit — declarative REST resources on axum
//!
//! Takes a declarative resource definition (name, prefix/path, supported
//! operations, authentication requirement, list-query adaptor) and derives
//! a set of HTTP routes, each with a JSON-schema-validated request
//! contract, a pluggable authentication pre-check and a uniform
//! error-to-HTTP translation.
//!
//! The pieces:
//!
//! - [`resource`]: the external resource contract (operations + field schema)
//! - [`path`]: route path derivation
//! - [`schema`]: projection of field schemas into per-operation fragments
//! - [`auth`]: authentication references and their resolution
//! - [`engine`]: expansion of resource definitions into registered routes
//! - [`gate`]: the server surface (guards, mounting, docs, serve loop)
//!
//! ```rust,ignore
//! let gate = Gate::new(GateConfig::default())
//!     .guard("bearerAuth", Arc::new(BearerGuard::new(verifier)))
//!     .mount(
//!         &MountDefaults::default().with_auth(AuthRef::named("bearerAuth")),
//!         vec![ResourceDef::new(widgets).with_list_adaptor(adaptor)],
//!     )?;
//! gate.serve(CancellationToken::new()).await
//! ```

pub mod actor;
mod adaptor;
pub mod auth;
pub mod bearer;
pub mod endpoint;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod gate;
pub mod list;
pub mod login;
pub mod openapi;
pub mod path;
pub mod resource;
pub mod schema;

pub use actor::Actor;
pub use auth::{AuthRef, Guard, GuardRegistry};
pub use bearer::{BearerGuard, TokenVerifier};
pub use endpoint::{Binding, EndpointDef, EnvelopeHandler};
pub use engine::{MountDefaults, ResourceDef};
pub use envelope::{JsonReply, RequestEnvelope};
pub use error::{HttpError, OpError};
pub use gate::{CorsConfig, DocsConfig, Gate, GateConfig, DEFAULT_PORT};
pub use list::ListAdaptor;
pub use login::{LoginHandler, LoginOptions};
pub use openapi::{OpenApiRegistry, OperationSpec};
pub use resource::{MethodsMapping, OperationKind, Resource, ResourceSchema};
pub use schema::OperationSchema;

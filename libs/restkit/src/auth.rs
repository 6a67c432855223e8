//! Authentication resolution.
//!
//! Routes reference their authentication requirement as a tagged variant:
//! explicitly open, a named check registered on the gate, or an inline
//! check. References are resolved once per route while mounting; the
//! resolved guard is what runs per request.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::request::Parts;

use crate::actor::Actor;
use crate::error::HttpError;

/// Pre-route authentication check.
///
/// A guard either produces the request's actor or rejects with an
/// HTTP-shaped error (conventionally 401). The routing layer attaches the
/// produced actor to the request envelope and takes no further action on
/// rejection.
#[async_trait]
pub trait Guard: Send + Sync {
    async fn check(&self, parts: &Parts) -> Result<Actor, HttpError>;
}

/// Authentication requirement of a route, resolved at mount time.
#[derive(Clone, Default)]
pub enum AuthRef {
    /// Explicitly open; overrides any inherited default.
    #[default]
    None,
    /// Named check registered on the gate by the authentication collaborator.
    Named(String),
    /// Inline check used directly.
    Check(Arc<dyn Guard>),
}

impl fmt::Debug for AuthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthRef::None => write!(f, "AuthRef::None"),
            AuthRef::Named(name) => write!(f, "AuthRef::Named({name:?})"),
            AuthRef::Check(_) => write!(f, "AuthRef::Check(..)"),
        }
    }
}

impl AuthRef {
    pub fn named(name: impl Into<String>) -> Self {
        AuthRef::Named(name.into())
    }

    pub fn check(guard: Arc<dyn Guard>) -> Self {
        AuthRef::Check(guard)
    }
}

/// Named checks registered on the gate before resources are mounted.
#[derive(Default)]
pub struct GuardRegistry {
    guards: HashMap<String, Arc<dyn Guard>>,
}

impl GuardRegistry {
    pub fn insert(&mut self, name: impl Into<String>, guard: Arc<dyn Guard>) {
        self.guards.insert(name.into(), guard);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Guard>> {
        self.guards.get(name).cloned()
    }

    /// Resolve an authentication reference into the guard attached to a
    /// route, or `None` for an open route.
    ///
    /// A named reference that is not registered resolves to a guard that
    /// rejects with 401 at request time: a missing check is a deployment
    /// mistake that surfaces on first use, not a mount failure.
    pub fn resolve(&self, auth: &AuthRef) -> Option<Arc<dyn Guard>> {
        match auth {
            AuthRef::None => None,
            AuthRef::Check(guard) => Some(guard.clone()),
            AuthRef::Named(name) => Some(self.get(name).unwrap_or_else(|| {
                Arc::new(UnresolvedGuard {
                    name: name.clone(),
                })
            })),
        }
    }
}

/// Stand-in for a named check that was never registered.
struct UnresolvedGuard {
    name: String,
}

#[async_trait]
impl Guard for UnresolvedGuard {
    async fn check(&self, _parts: &Parts) -> Result<Actor, HttpError> {
        tracing::warn!(check = %self.name, "authentication check is not registered");
        Err(HttpError::unauthorized("Authentication is not available"))
    }
}

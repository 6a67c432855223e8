//! Bearer-token guard.
//!
//! Token verification itself is delegated to a collaborator; this guard
//! only extracts the credential, invokes the verifier and shapes the 401
//! rejections.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::actor::Actor;
use crate::auth::Guard;
use crate::error::HttpError;

/// Verifies an opaque bearer token and produces the request actor.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> anyhow::Result<Actor>;
}

/// Guard reading `Authorization: Bearer <token>`.
pub struct BearerGuard {
    verifier: Arc<dyn TokenVerifier>,
}

impl BearerGuard {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl Guard for BearerGuard {
    async fn check(&self, parts: &Parts) -> Result<Actor, HttpError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        if token.is_empty() {
            return Err(HttpError::unauthorized("Session invalid or expired"));
        }

        self.verifier.verify(token).await.map_err(|error| {
            tracing::debug!(%error, "bearer token verification failed");
            HttpError::unauthorized("Session check failed")
        })
    }
}

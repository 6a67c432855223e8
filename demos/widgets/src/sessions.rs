//! Demo session handling: a fixed credential table, random session tokens
//! held in memory, and the verifier the bearer guard calls back into.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use uuid::Uuid;

use restkit::error::{HttpError, OpError};
use restkit::{Actor, JsonReply, LoginHandler, TokenVerifier};

pub struct SessionStore {
    /// username → password for the demo accounts.
    accounts: DashMap<String, String>,
    /// token → actor for sessions issued by the login route.
    sessions: DashMap<String, Actor>,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        let accounts = DashMap::new();
        accounts.insert("admin".to_string(), "admin".to_string());
        Arc::new(Self {
            accounts,
            sessions: DashMap::new(),
        })
    }
}

#[async_trait]
impl LoginHandler for SessionStore {
    async fn login(&self, body: Value) -> Result<JsonReply, OpError> {
        let username = body["username"].as_str().unwrap_or_default();
        let password = body["password"].as_str().unwrap_or_default();

        let valid = self
            .accounts
            .get(username)
            .map(|stored| stored.value() == password)
            .unwrap_or(false);
        if !valid {
            return Err(HttpError::unauthorized("Bad credentials").into());
        }

        let token = Uuid::new_v4().to_string();
        let actor = Actor::new(username).with_permissions([
            "inventory.widgets.create",
            "inventory.widgets.get",
            "inventory.widgets.update",
            "inventory.widgets.replace",
            "inventory.widgets.delete",
            "inventory.widgets.list",
        ]);
        self.sessions.insert(token.clone(), actor);

        Ok(JsonReply::ok(json!({ "token": token })))
    }
}

#[async_trait]
impl TokenVerifier for SessionStore {
    async fn verify(&self, token: &str) -> anyhow::Result<Actor> {
        self.sessions
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| anyhow::anyhow!("unknown session token"))
    }
}

use serde::{Deserialize, Serialize};

/// Authenticated identity attached to a request by a [`Guard`](crate::auth::Guard).
///
/// The routing layer treats the actor as opaque: it is produced by an
/// authentication check and handed to resource operations unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Actor {
    /// Stable subject identifier (user id, service account name, ...).
    pub id: String,
    /// Permission strings granted to this actor.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Free-form claims carried by the credential that produced this actor.
    #[serde(default)]
    pub claims: serde_json::Value,
}

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            permissions: Vec::new(),
            claims: serde_json::Value::Null,
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn can(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_lookup() {
        let actor = Actor::new("u1").with_permissions(["widgets.create", "widgets.view"]);
        assert!(actor.can("widgets.create"));
        assert!(!actor.can("widgets.delete"));
    }
}

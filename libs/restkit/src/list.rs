use std::collections::HashMap;

use serde_json::Value;

use crate::envelope::JsonReply;
use crate::error::HttpError;

/// Strategy translating raw query parameters into a structured list query
/// and shaping the list response.
///
/// Listing is opt-in per resource: a resource that declares a `list` route
/// without a configured adaptor simply does not get that route.
pub trait ListAdaptor: Send + Sync {
    /// Accepted query-parameter names, in declaration order. Each is typed
    /// as a string in the projected query schema.
    fn params(&self) -> Vec<String>;

    /// Parse the raw query string map into the parameter value handed to
    /// the resource's `list` operation.
    fn parse(&self, resource_name: &str, raw: &HashMap<String, String>)
        -> Result<Value, HttpError>;

    /// Shape the list result into the reply written to the client
    /// (headers carry pagination metadata, body carries the page).
    fn shape(&self, result: Value, parsed: &Value, resource_name: &str) -> JsonReply;
}

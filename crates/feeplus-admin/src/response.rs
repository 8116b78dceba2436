//! GraphQL response envelope and mutation error payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AdminError;

/// A top-level GraphQL error (`errors[]` in the response envelope).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

/// The `{ data, errors }` envelope returned by every GraphQL call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

impl GraphqlResponse {
    /// Builds a successful envelope around `data`.
    pub fn from_data(data: Value) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    /// Builds an envelope carrying only top-level errors.
    pub fn from_errors<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data: Value::Null,
            errors: messages
                .into_iter()
                .map(|m| GraphqlError {
                    message: m.into(),
                    path: None,
                    extensions: None,
                })
                .collect(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `data`, or the top-level errors when any were reported.
    ///
    /// A response with errors is never trusted, even when partial data is
    /// present.
    pub fn into_data(self) -> Result<Value, AdminError> {
        if self.errors.is_empty() {
            Ok(self.data)
        } else {
            Err(AdminError::GraphQL(
                self.errors.into_iter().map(|e| e.message).collect(),
            ))
        }
    }
}

/// A business-rule rejection reported by a mutation payload (`userErrors`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl UserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
            code: None,
        }
    }

    /// Extracts `userErrors` from a mutation payload object.
    ///
    /// Entries are read leniently: every entry of a non-empty list yields a
    /// `UserError`, falling back to the entry's JSON text as the message.
    pub fn from_payload(payload: &Value) -> Vec<UserError> {
        payload
            .get("userErrors")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(Self::from_entry).collect())
            .unwrap_or_default()
    }

    fn from_entry(entry: &Value) -> Self {
        let message = entry
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| entry.to_string());
        // Field paths mix names and list indexes, e.g. ["metafields", 0, "value"].
        let field = entry.get("field").and_then(Value::as_array).map(|path| {
            path.iter()
                .map(|p| match p {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        });
        let code = entry
            .get("code")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            field,
            message,
            code,
        }
    }
}

/// Joins user error messages into one human-readable line.
pub fn join_messages(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(" | ")
}

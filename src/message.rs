//! The JSON body for successful writes.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::database_id::DatabaseId;

/// A confirmation sent back after a successful create, update or delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// What happened, e.g. "Budget created successfully".
    pub message: String,
    /// The ID of the record that was created, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DatabaseId>,
}

impl Message {
    /// A message without an ID.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    /// A message for a newly created record.
    pub fn created(message: impl Into<String>, id: DatabaseId) -> Self {
        Self {
            message: message.into(),
            id: Some(id),
        }
    }
}

impl IntoResponse for Message {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod message_tests {
    use serde_json::json;

    use super::Message;

    #[test]
    fn omits_missing_id() {
        let value = serde_json::to_value(Message::new("Income saved successfully")).unwrap();

        assert_eq!(value, json!({"message": "Income saved successfully"}));
    }

    #[test]
    fn includes_created_id() {
        let value = serde_json::to_value(Message::created("Budget created successfully", 3))
            .unwrap();

        assert_eq!(
            value,
            json!({"message": "Budget created successfully", "id": 3})
        );
    }
}

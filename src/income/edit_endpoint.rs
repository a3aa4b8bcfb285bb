//! Defines the endpoint for replacing an income.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::IncomeId,
    extract::JsonBody,
    income::core::{IncomeData, update_income},
    message::Message,
    money::Money,
};

/// The state needed to edit an income.
#[derive(Debug, Clone)]
pub struct EditIncomeState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The ID of the income to edit and its new fields.
#[derive(Debug, Serialize, Deserialize)]
pub struct IncomeEdit {
    pub id: IncomeId,
    #[serde(default)]
    pub name: String,
    pub amount: Money,
    #[serde(default)]
    pub source: String,
    #[serde(with = "crate::date_format")]
    pub date: Date,
    #[serde(default)]
    pub notes: String,
}

impl IncomeEdit {
    fn into_parts(self) -> (IncomeId, IncomeData) {
        (
            self.id,
            IncomeData {
                name: self.name,
                amount: self.amount,
                source: self.source,
                date: self.date,
                notes: self.notes,
            },
        )
    }
}

/// A route handler for replacing every field of one of the logged in user's incomes.
pub async fn edit_income_endpoint(
    State(state): State<EditIncomeState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(edit): JsonBody<IncomeEdit>,
) -> Response {
    let (id, data) = edit.into_parts();
    let data = match data.validate() {
        Ok(data) => data,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_income(id, user_id, &data, &connection) {
        Ok(_) => Message::new("Income edited successfully").into_response(),
        Err(error) => error.into_response(),
    }
}

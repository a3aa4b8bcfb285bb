//! Defines the endpoint for recording an income.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    extract::JsonBody,
    income::core::{IncomeData, create_income},
    message::Message,
};

/// The state needed to record an income.
#[derive(Debug, Clone)]
pub struct CreateIncomeState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for recording an income for the logged in user.
pub async fn create_income_endpoint(
    State(state): State<CreateIncomeState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<IncomeData>,
) -> Response {
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

    match create_income(user_id, &data, &connection) {
        Ok(income) => Message::created("Income saved successfully", income.id).into_response(),
        Err(error) => error.into_response(),
    }
}

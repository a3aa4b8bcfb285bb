//! Defines the endpoint for creating a budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, auth::UserID, budget::core::create_budget, category::Category,
    extract::JsonBody, message::Message, money::Money,
};

/// The state needed to create a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The category and limit for a new budget.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewBudget {
    pub category: Category,
    pub limit: Money,
}

/// A route handler for creating a budget for the logged in user.
///
/// Responds with the new budget's ID.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(new_budget): JsonBody<NewBudget>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_budget(user_id, new_budget.category, new_budget.limit, &connection) {
        Ok(budget) => Message::created("Budget created successfully", budget.id).into_response(),
        Err(error) => error.into_response(),
    }
}

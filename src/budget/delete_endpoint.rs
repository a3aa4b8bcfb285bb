//! Defines the endpoint for deleting a budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, auth::UserID, budget::core::delete_budget, database_id::BudgetId,
    extract::JsonBody, message::Message,
};

/// The state needed to delete a budget.
#[derive(Debug, Clone)]
pub struct DeleteBudgetState {
    /// The database connection for managing budgets.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Identifies the budget to delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetRef {
    pub id: BudgetId,
}

/// A route handler for deleting one of the logged in user's budgets.
///
/// Expenses in the budget's category are kept. Later changes to them go
/// through the missing budget policy, so under the `reject` policy they are
/// locked until a budget for the category is created again.
pub async fn delete_budget_endpoint(
    State(state): State<DeleteBudgetState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(budget): JsonBody<BudgetRef>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_budget(budget.id, user_id, &connection) {
        Ok(()) => Message::new("Budget deleted successfully").into_response(),
        Err(error) => error.into_response(),
    }
}

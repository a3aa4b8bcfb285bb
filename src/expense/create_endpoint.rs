//! Defines the endpoint for recording an expense.

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
    budget::MissingBudgetPolicy,
    expense::core::{ExpenseData, record_expense},
    extract::JsonBody,
    message::Message,
};

/// The state needed to record an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// What to do if the expense's category has no budget.
    pub missing_budget_policy: MissingBudgetPolicy,
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            missing_budget_policy: state.missing_budget_policy,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for recording an expense for the logged in user.
///
/// The amount is added to the budget for the expense's category. Responds
/// with the new expense's ID.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<ExpenseData>,
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

    match record_expense(user_id, &data, state.missing_budget_policy, &connection) {
        Ok(expense) => Message::created("Expense saved successfully", expense.id).into_response(),
        Err(error) => error.into_response(),
    }
}

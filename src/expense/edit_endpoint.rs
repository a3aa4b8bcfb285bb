//! Defines the endpoint for replacing an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::MissingBudgetPolicy,
    database_id::ExpenseId,
    expense::core::{Expense, ExpenseData, edit_expense},
    extract::{JsonBody, PathParam},
};

/// The state needed to edit an expense.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    /// What to do if a category the edit touches has no budget.
    pub missing_budget_policy: MissingBudgetPolicy,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            missing_budget_policy: state.missing_budget_policy,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for replacing every field of one of the logged in user's
/// expenses. Responds with the updated expense.
///
/// Budgets follow the change: a new amount adjusts the budget by the
/// difference, and a new category moves the amount to the other budget.
pub async fn edit_expense_endpoint(
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
    PathParam(expense_id): PathParam<ExpenseId>,
    JsonBody(data): JsonBody<ExpenseData>,
) -> Result<Json<Expense>, Error> {
    let data = data.validate()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    edit_expense(
        expense_id,
        user_id,
        &data,
        state.missing_budget_policy,
        &connection,
    )
    .map(Json)
}

//! Defines the endpoints for listing budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::core::{Budget, BudgetWithOwner, get_all_budgets, get_user_budgets},
};

/// The state needed to list budgets.
#[derive(Debug, Clone)]
pub struct ListBudgetsState {
    /// The database connection for reading budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListBudgetsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The logged in user's budgets.
#[derive(Debug, Serialize)]
pub struct UserBudgets {
    pub budgets: Vec<Budget>,
}

/// A route handler that lists the budgets of every user along with their usernames.
pub async fn get_all_budgets_endpoint(
    State(state): State<ListBudgetsState>,
) -> Result<Json<Vec<BudgetWithOwner>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_all_budgets(&connection).map(Json)
}

/// A route handler that lists the logged in user's budgets.
pub async fn get_user_budgets_endpoint(
    State(state): State<ListBudgetsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<UserBudgets>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_user_budgets(user_id, &connection)?;

    Ok(Json(UserBudgets { budgets }))
}

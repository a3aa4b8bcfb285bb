//! Defines the endpoints for changing a budget's category and limit.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserID,
    budget::core::{Budget, update_budget},
    category::Category,
    database_id::BudgetId,
    extract::{JsonBody, PathParam},
    message::Message,
    money::Money,
};

/// The state needed to edit a budget.
#[derive(Debug, Clone)]
pub struct EditBudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A partial update to a budget. Missing fields are left unchanged.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetEdit {
    pub id: BudgetId,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub limit: Option<Money>,
}

/// A route handler for editing one of the logged in user's budgets.
///
/// Moving a budget to another category recomputes its amount spent from the
/// user's expenses in that category.
pub async fn edit_budget_endpoint(
    State(state): State<EditBudgetState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(edit): JsonBody<BudgetEdit>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_budget(edit.id, user_id, edit.category, edit.limit, &connection) {
        Ok(_) => Message::new("Budget updated successfully").into_response(),
        Err(error) => error.into_response(),
    }
}

/// The new limit for a budget.
#[derive(Debug, Serialize, Deserialize)]
pub struct LimitUpdate {
    #[serde(default)]
    pub limit: Option<Money>,
}

/// A route handler for setting the limit of one of the logged in user's budgets.
///
/// Responds with the updated budget.
pub async fn update_budget_limit_endpoint(
    State(state): State<EditBudgetState>,
    Extension(user_id): Extension<UserID>,
    PathParam(budget_id): PathParam<BudgetId>,
    JsonBody(update): JsonBody<LimitUpdate>,
) -> Result<Json<Budget>, Error> {
    let limit = update.limit.ok_or(Error::NegativeLimit)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_budget(budget_id, user_id, None, Some(limit), &connection).map(Json)
}

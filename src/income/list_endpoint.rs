//! Defines the endpoints for reading incomes.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::IncomeId,
    extract::QueryParams,
    income::core::{Income, get_all_incomes, get_income, get_user_incomes},
};

/// The state needed to read incomes.
#[derive(Debug, Clone)]
pub struct ListIncomesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListIncomesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists the incomes of every user.
pub async fn get_all_incomes_endpoint(
    State(state): State<ListIncomesState>,
) -> Result<Json<Vec<Income>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_all_incomes(&connection).map(Json)
}

/// A route handler that lists the logged in user's incomes, newest first.
pub async fn get_user_incomes_endpoint(
    State(state): State<ListIncomesState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Income>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_user_incomes(user_id, &connection).map(Json)
}

#[derive(Debug, Deserialize)]
pub struct IncomeQuery {
    id: Option<IncomeId>,
}

/// A route handler that gets one of the logged in user's incomes by the `id`
/// query parameter.
pub async fn get_income_by_id_endpoint(
    State(state): State<ListIncomesState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<IncomeQuery>,
) -> Result<Json<Income>, Error> {
    let id = query.id.ok_or(Error::MissingField("id"))?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_income(id, user_id, &connection).map(Json)
}

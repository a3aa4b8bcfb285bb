//! Defines the endpoint for deleting an income.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, auth::UserID, database_id::IncomeId, extract::JsonBody,
    income::core::delete_income, message::Message,
};

/// The state needed to delete an income.
#[derive(Debug, Clone)]
pub struct DeleteIncomeState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteIncomeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Identifies the income to delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct IncomeRef {
    pub id: IncomeId,
}

/// A route handler for deleting one of the logged in user's incomes.
pub async fn delete_income_endpoint(
    State(state): State<DeleteIncomeState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(income): JsonBody<IncomeRef>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_income(income.id, user_id, &connection) {
        Ok(()) => Message::new("Income deleted successfully").into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod delete_income_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        ErrorBody, endpoints,
        income::get_user_incomes,
        message::Message,
        test_utils::{create_test_income, get_test_server, register_and_log_in, user_id_of},
    };

    #[tokio::test]
    async fn deletes_own_income() {
        let (server, state) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;
        let id = create_test_income(&server, &cookie, "Salary", "2025-01-31").await;

        let response = server
            .post(endpoints::DELETE_INCOME)
            .add_cookie(cookie)
            .json(&json!({"id": id}))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Message>(),
            Message::new("Income deleted successfully")
        );
        assert_eq!(
            get_user_incomes(
                user_id_of(&state, "alice"),
                &state.db_connection.lock().unwrap()
            ),
            Ok(vec![])
        );
    }

    #[tokio::test]
    async fn cannot_delete_other_users_income() {
        let (server, state) = get_test_server();
        let alice = register_and_log_in(&server, "alice").await;
        let bob = register_and_log_in(&server, "bob").await;
        let id = create_test_income(&server, &alice, "Salary", "2025-01-31").await;

        let response = server
            .post(endpoints::DELETE_INCOME)
            .add_cookie(bob)
            .json(&json!({"id": id}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(
            response.json::<ErrorBody>().message,
            "Income not found or not authorized."
        );
        assert_eq!(
            get_user_incomes(
                user_id_of(&state, "alice"),
                &state.db_connection.lock().unwrap()
            )
            .unwrap()
            .len(),
            1
        );
    }

    #[tokio::test]
    async fn requires_id() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;

        let response = server
            .post(endpoints::DELETE_INCOME)
            .add_cookie(cookie)
            .json(&json!({}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

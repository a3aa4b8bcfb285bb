//! Defines the endpoints for reading expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::ExpenseId,
    expense::core::{Expense, get_expense, get_user_expenses},
    extract::PathParam,
};

/// The state needed to read expenses.
#[derive(Debug, Clone)]
pub struct ListExpensesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListExpensesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that lists the logged in user's expenses, newest first.
pub async fn get_user_expenses_endpoint(
    State(state): State<ListExpensesState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Expense>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_user_expenses(user_id, &connection).map(Json)
}

/// A route handler that gets one of the logged in user's expenses.
pub async fn get_expense_endpoint(
    State(state): State<ListExpensesState>,
    Extension(user_id): Extension<UserID>,
    PathParam(expense_id): PathParam<ExpenseId>,
) -> Result<Json<Expense>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_expense(expense_id, user_id, &connection).map(Json)
}

#[cfg(test)]
mod list_expenses_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        ErrorBody,
        endpoints::{self, format_endpoint},
        test_utils::{create_test_expense, get_test_server, register_and_log_in},
    };

    #[tokio::test]
    async fn lists_own_expenses_newest_first() {
        let (server, _) = get_test_server();
        let alice = register_and_log_in(&server, "alice").await;
        let bob = register_and_log_in(&server, "bob").await;
        create_test_expense(&server, &alice, "Old", 10, "Shopping", "2025-01-01").await;
        create_test_expense(&server, &alice, "New", 20, "Shopping", "2025-02-01").await;
        create_test_expense(&server, &bob, "Bob's", 30, "Shopping", "2025-03-01").await;

        let response = server.get(endpoints::EXPENSES).add_cookie(alice).await;

        response.assert_status_ok();
        let expenses = response.json::<Vec<Value>>();
        let names: Vec<_> = expenses.iter().map(|expense| &expense["name"]).collect();
        assert_eq!(names, vec![&json!("New"), &json!("Old")]);
        assert_eq!(expenses[0]["date"], "2025-02-01");
        assert_eq!(expenses[0]["amount"], json!(20.0));
        assert_eq!(expenses[0]["receipt"], Value::Null);
    }

    #[tokio::test]
    async fn gets_own_expense() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;
        let id = create_test_expense(&server, &cookie, "Cinema", 18, "Entertainment", "2025-01-05")
            .await;

        let response = server
            .get(&format_endpoint(endpoints::EXPENSE, id))
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({
                "id": id,
                "name": "Cinema",
                "amount": 18.0,
                "category": "Entertainment",
                "date": "2025-01-05",
                "notes": "",
                "receipt": null
            })
        );
    }

    #[tokio::test]
    async fn other_users_expense_is_not_found() {
        let (server, _) = get_test_server();
        let alice = register_and_log_in(&server, "alice").await;
        let bob = register_and_log_in(&server, "bob").await;
        let id = create_test_expense(&server, &alice, "Cinema", 18, "Entertainment", "2025-01-05")
            .await;

        let response = server
            .get(&format_endpoint(endpoints::EXPENSE, id))
            .add_cookie(bob)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(
            response.json::<ErrorBody>().message,
            "Expense not found or not authorized."
        );
    }
}

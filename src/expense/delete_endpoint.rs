//! Defines the endpoint for deleting an expense.

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
    database_id::ExpenseId,
    expense::core::remove_expense,
    extract::PathParam,
    message::Message,
};

/// The state needed to delete an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    /// What to do if the expense's category has no budget.
    pub missing_budget_policy: MissingBudgetPolicy,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            missing_budget_policy: state.missing_budget_policy,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting one of the logged in user's expenses.
///
/// The amount is taken off the budget for the expense's category and the
/// receipt file, if any, is removed.
pub async fn delete_expense_endpoint(
    State(state): State<DeleteExpenseState>,
    Extension(user_id): Extension<UserID>,
    PathParam(expense_id): PathParam<ExpenseId>,
) -> Response {
    let deleted = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match remove_expense(
            expense_id,
            user_id,
            state.missing_budget_policy,
            &connection,
        ) {
            Ok(deleted) => deleted,
            Err(error) => return error.into_response(),
        }
    };

    if let Some(receipt) = deleted.receipt {
        if let Err(error) = tokio::fs::remove_file(&receipt).await {
            tracing::warn!(
                "Could not remove receipt {receipt} of deleted expense {expense_id}: {error}"
            );
        }
    }

    Message::new("Expense deleted successfully").into_response()
}

#[cfg(test)]
mod delete_expense_endpoint_tests {
    use axum::http::StatusCode;

    use crate::{
        Category, Money,
        budget::get_budget_by_category,
        endpoints::{self, format_endpoint},
        expense::get_user_expenses,
        message::Message,
        test_utils::{create_test_expense, get_test_server, register_and_log_in, user_id_of},
    };

    #[tokio::test]
    async fn delete_removes_expense_and_amount_spent() {
        let (server, state) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;
        let user_id = user_id_of(&state, "alice");
        let id = create_test_expense(&server, &cookie, "Gym", 60, "Healthcare", "2025-01-05").await;

        let response = server
            .delete(&format_endpoint(endpoints::EXPENSE, id))
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Message>(),
            Message::new("Expense deleted successfully")
        );
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_user_expenses(user_id, &connection), Ok(vec![]));
        let budget = get_budget_by_category(user_id, Category::Healthcare, &connection).unwrap();
        assert_eq!(budget.spent, Money::ZERO);
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;
        let id = create_test_expense(&server, &cookie, "Gym", 60, "Healthcare", "2025-01-05").await;
        let path = format_endpoint(endpoints::EXPENSE, id);

        server.delete(&path).add_cookie(cookie.clone()).await.assert_status_ok();
        let response = server.delete(&path).add_cookie(cookie).await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cannot_delete_other_users_expense() {
        let (server, state) = get_test_server();
        let alice = register_and_log_in(&server, "alice").await;
        let bob = register_and_log_in(&server, "bob").await;
        let id = create_test_expense(&server, &alice, "Gym", 60, "Healthcare", "2025-01-05").await;

        let response = server
            .delete(&format_endpoint(endpoints::EXPENSE, id))
            .add_cookie(bob)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let alice_id = user_id_of(&state, "alice");
        assert_eq!(
            get_user_expenses(alice_id, &state.db_connection.lock().unwrap())
                .unwrap()
                .len(),
            1
        );
    }
}

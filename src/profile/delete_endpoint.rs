//! Defines the endpoint for deleting the logged in user's account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use axum_extra::extract::PrivateCookieJar;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{UserID, delete_user, invalidate_auth_cookie},
    expense::get_user_expenses,
    message::Message,
};

/// The state needed to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that deletes the logged in user along with their budgets,
/// expenses, incomes and receipt files, and ends the session.
pub async fn delete_account_endpoint(
    State(state): State<DeleteAccountState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Message), Error> {
    let receipts: Vec<String> = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        let transaction = connection.unchecked_transaction()?;

        let receipts = get_user_expenses(user_id, &transaction)?
            .into_iter()
            .filter_map(|expense| expense.receipt)
            .collect();
        delete_user(user_id, &transaction)?;

        transaction.commit()?;
        receipts
    };

    for receipt in receipts {
        if let Err(error) = tokio::fs::remove_file(&receipt).await {
            tracing::warn!("Could not remove receipt {receipt} of deleted user {user_id}: {error}");
        }
    }

    tracing::info!("Deleted user {user_id}");

    Ok((
        invalidate_auth_cookie(jar),
        Message::new("Account deleted successfully"),
    ))
}

#[cfg(test)]
mod delete_account_endpoint_tests {
    use axum::http::StatusCode;
    use time::Duration;

    use crate::{
        auth::{COOKIE_TOKEN, count_users},
        endpoints,
        message::Message,
        test_utils::{create_test_expense, create_test_income, get_test_server, register_and_log_in},
    };

    #[tokio::test]
    async fn deletes_user_and_their_records() {
        let (server, state) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;
        register_and_log_in(&server, "bob").await;
        create_test_expense(&server, &cookie, "Lunch", 12, "Food & Dining", "2025-01-05").await;
        create_test_income(&server, &cookie, "Salary", "2025-01-31").await;

        let response = server.delete(endpoints::PROFILE).add_cookie(cookie).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Message>(),
            Message::new("Account deleted successfully")
        );
        assert_eq!(response.cookie(COOKIE_TOKEN).max_age(), Some(Duration::ZERO));

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_users(&connection), Ok(1));
        for table in ["budget", "expense", "income"] {
            let orphans: i64 = connection
                .query_row(
                    &format!(
                        "SELECT COUNT(*) FROM {table} WHERE user_id NOT IN (SELECT id FROM user)"
                    ),
                    [],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(orphans, 0, "want no {table} rows left for the deleted user");
        }
    }

    #[tokio::test]
    async fn old_session_cookie_stops_working() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;

        server
            .delete(endpoints::PROFILE)
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();

        // The cookie is still well formed, but its user is gone.
        server
            .get(endpoints::PROFILE)
            .add_cookie(cookie)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

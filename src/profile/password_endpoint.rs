//! Defines the endpoint for changing the logged in user's password.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash,
    auth::{UserID, get_user_by_id, update_password},
    extract::JsonBody,
    message::Message,
};

/// The state needed to change a user's password.
#[derive(Debug, Clone)]
pub struct ChangePasswordState {
    /// The bcrypt cost for hashing the new password.
    pub password_hash_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ChangePasswordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The user's current password and the one to replace it with.
#[derive(Debug, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// A route handler for changing the logged in user's password.
///
/// The session stays valid afterwards.
///
/// # Errors
///
/// Returns a 400 error if the current password is wrong or the new one is too weak.
pub async fn change_password_endpoint(
    State(state): State<ChangePasswordState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(change): JsonBody<PasswordChange>,
) -> Result<Message, Error> {
    if change.new_password.is_empty() {
        return Err(Error::MissingField("new_password"));
    }

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        get_user_by_id(user_id, &connection)?
    };

    if !user.password_hash.verify(&change.current_password)? {
        return Err(Error::IncorrectPassword);
    }

    let new_hash = PasswordHash::from_raw_password(
        &change.new_password,
        &[user.username.as_str(), user.email.as_str()],
        state.password_hash_cost,
    )?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    update_password(user_id, &new_hash, &connection)?;

    tracing::info!("User {user_id} changed their password");

    Ok(Message::new("Password changed successfully"))
}

#[cfg(test)]
mod change_password_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        ErrorBody, endpoints,
        message::Message,
        test_utils::{TEST_PASSWORD, get_test_server, register_and_log_in},
    };

    const NEW_PASSWORD: &str = "purple monkey dishwasher tundra";

    #[tokio::test]
    async fn changes_password() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;

        let response = server
            .put(endpoints::PASSWORD)
            .add_cookie(cookie)
            .json(&json!({"current_password": TEST_PASSWORD, "new_password": NEW_PASSWORD}))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Message>(),
            Message::new("Password changed successfully")
        );
        server
            .post(endpoints::LOG_IN)
            .json(&json!({"name": "alice", "password": TEST_PASSWORD}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .post(endpoints::LOG_IN)
            .json(&json!({"name": "alice", "password": NEW_PASSWORD}))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn rejects_wrong_current_password() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;

        let response = server
            .put(endpoints::PASSWORD)
            .add_cookie(cookie)
            .json(&json!({"current_password": "not it", "new_password": NEW_PASSWORD}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<ErrorBody>().message,
            "Current password is incorrect."
        );
    }

    #[tokio::test]
    async fn rejects_weak_new_password() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;

        let response = server
            .put(endpoints::PASSWORD)
            .add_cookie(cookie)
            .json(&json!({"current_password": TEST_PASSWORD, "new_password": "alice123"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<ErrorBody>().message,
            "Password is too weak."
        );
    }
}

//! The endpoint for logging in with a username and password.
//! The auth module handles the lower level authentication and cookie auth logic.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{set_auth_cookie, user::get_user_by_username},
    extract::{JsonBody, require_text},
    message::Message,
};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent with a log-in request.
///
/// The password is a plain string. There is no need for validation here since
/// it will be compared against the hash in the database.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogInData {
    /// The username.
    pub name: String,
    pub password: String,
}

/// Handler for log-in requests.
///
/// On success the auth cookie is set on the response.
///
/// # Errors
///
/// Returns a 401 error if the username does not exist or the password is
/// wrong. Both cases get the same response so that usernames cannot be
/// probed.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    JsonBody(user_data): JsonBody<LogInData>,
) -> Result<(PrivateCookieJar, Message), Error> {
    let username = require_text(&user_data.name, "name")?;
    if user_data.password.is_empty() {
        return Err(Error::MissingField("password"));
    }

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_username(username, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    if !user.password_hash.verify(&user_data.password)? {
        tracing::debug!("Rejected log in for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((jar, Message::new("Login successful")))
}

#[cfg(test)]
mod log_in_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        ErrorBody,
        auth::COOKIE_TOKEN,
        endpoints,
        message::Message,
        test_utils::{TEST_PASSWORD, get_test_server, register},
    };

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let (server, _) = get_test_server();
        register(&server, "alice").await;

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"name": "alice", "password": TEST_PASSWORD}))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Message>(), Message::new("Login successful"));
        let cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let (server, _) = get_test_server();
        register(&server, "alice").await;

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"name": "alice", "password": "not the right password"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<ErrorBody>().message, "Invalid credentials.");
        assert!(response.cookies().get(COOKIE_TOKEN).is_none());
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_user() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"name": "nobody", "password": TEST_PASSWORD}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<ErrorBody>().message, "Invalid credentials.");
    }

    #[tokio::test]
    async fn log_in_requires_password() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"name": "alice", "password": ""}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<ErrorBody>().message,
            "Missing required field: password."
        );
    }
}

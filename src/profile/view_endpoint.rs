//! Defines the endpoints for reading the logged in user's details.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{User, UserID, get_user_by_id},
};

/// The state needed to read a user's profile.
#[derive(Debug, Clone)]
pub struct ProfileState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The name of the logged in user.
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
}

/// The public details of a user's account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub email: String,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
        }
    }
}

fn get_session_user(state: &ProfileState, user_id: UserID) -> Result<User, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    // The session can outlive the account, e.g. a cookie sent after deletion.
    get_user_by_id(user_id, &connection).map_err(|error| match error {
        Error::NotFound => Error::NotAuthenticated,
        error => error,
    })
}

/// A route handler that responds with the logged in user's name.
pub async fn get_current_user_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<CurrentUser>, Error> {
    let user = get_session_user(&state, user_id)?;

    Ok(Json(CurrentUser {
        username: user.username,
    }))
}

/// A route handler that responds with the logged in user's name and email.
pub async fn get_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Profile>, Error> {
    get_session_user(&state, user_id).map(|user| Json(user.into()))
}

#[cfg(test)]
mod view_profile_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        test_utils::{get_test_server, register_and_log_in},
    };

    #[tokio::test]
    async fn current_user_has_username() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;

        let response = server.get(endpoints::CURRENT_USER).add_cookie(cookie).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!({"username": "alice"}));
    }

    #[tokio::test]
    async fn profile_has_username_and_email() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;

        let response = server.get(endpoints::PROFILE).add_cookie(cookie).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({"username": "alice", "email": "alice@example.com"})
        );
    }

    #[tokio::test]
    async fn profile_requires_session() {
        let (server, _) = get_test_server();

        server
            .get(endpoints::PROFILE)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get(endpoints::CURRENT_USER)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

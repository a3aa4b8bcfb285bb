//! Defines the endpoint for changing the logged in user's name and email.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{UserID, update_profile},
    extract::{JsonBody, require_text},
    profile::Profile,
};

/// The state needed to update a user's profile.
#[derive(Debug, Clone)]
pub struct UpdateProfileState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The new username and email.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
}

/// A route handler for changing the logged in user's username and email.
///
/// Responds with the updated profile.
pub async fn update_profile_endpoint(
    State(state): State<UpdateProfileState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> Result<Json<Profile>, Error> {
    let username = require_text(&update.name, "name")?;
    let email = require_text(&update.email, "email")?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = update_profile(user_id, username, email, &connection)?;

    tracing::info!("User {user_id} updated their profile");

    Ok(Json(user.into()))
}

#[cfg(test)]
mod update_profile_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        ErrorBody, endpoints,
        profile::Profile,
        test_utils::{get_test_server, register_and_log_in},
    };

    #[tokio::test]
    async fn updates_username_and_email() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;

        let response = server
            .put(endpoints::PROFILE)
            .add_cookie(cookie.clone())
            .json(&json!({"name": "alicia", "email": "alicia@example.com"}))
            .await;

        response.assert_status_ok();
        let want = Profile {
            username: "alicia".to_owned(),
            email: "alicia@example.com".to_owned(),
        };
        assert_eq!(response.json::<Profile>(), want);
        let profile = server
            .get(endpoints::PROFILE)
            .add_cookie(cookie)
            .await
            .json::<Profile>();
        assert_eq!(profile, want);
    }

    #[tokio::test]
    async fn rejects_taken_email_and_username() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;
        register_and_log_in(&server, "bob").await;

        let response = server
            .put(endpoints::PROFILE)
            .add_cookie(cookie.clone())
            .json(&json!({"name": "alice", "email": "BOB@example.com"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<ErrorBody>().message, "Email already taken.");

        let response = server
            .put(endpoints::PROFILE)
            .add_cookie(cookie)
            .json(&json!({"name": "bob", "email": "alice@example.com"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<ErrorBody>().message,
            "Username already taken."
        );
    }

    #[tokio::test]
    async fn rejects_blank_fields() {
        let (server, _) = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;

        let response = server
            .put(endpoints::PROFILE)
            .add_cookie(cookie)
            .json(&json!({"name": "alice", "email": " "}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<ErrorBody>().message,
            "Missing required field: email."
        );
    }
}

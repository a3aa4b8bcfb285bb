//! The endpoint for creating a new account.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::user::create_user,
    budget::create_default_budgets,
    extract::{JsonBody, require_text},
    message::Message,
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The bcrypt cost for hashing the new user's password.
    pub password_hash_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The details a new user signs up with.
///
/// Absent fields default to empty so they are reported as missing.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterData {
    /// The username to log in with.
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Register a new user and give them a zero budget for every category.
///
/// The user and their budgets are created in one transaction, so a failure
/// leaves no trace of the new account. The user is not logged in.
///
/// # Errors
///
/// Returns a 400 error if a field is missing, the password is too weak, or
/// the username or email belongs to someone else.
pub async fn register_user(
    State(state): State<RegistrationState>,
    JsonBody(user_data): JsonBody<RegisterData>,
) -> Result<Message, Error> {
    let username = require_text(&user_data.name, "name")?;
    let email = require_text(&user_data.email, "email")?;
    if user_data.password.is_empty() {
        return Err(Error::MissingField("password"));
    }

    let validated_password = ValidatedPassword::new(&user_data.password, &[username, email])?;
    let password_hash = PasswordHash::new(validated_password, state.password_hash_cost)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let transaction = connection.unchecked_transaction()?;

    let user = create_user(username, email, password_hash, &transaction)?;
    create_default_budgets(user.id, &transaction)?;

    transaction.commit()?;

    tracing::info!("Registered user {} ({})", user.id, user.username);

    Ok(Message::new("User registered successfully."))
}

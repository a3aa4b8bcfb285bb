//! Implements a struct that holds the state of the REST server.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, MissingBudgetPolicy, PasswordHash, auth::DEFAULT_COOKIE_DURATION, db::initialize};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,

    /// What to do when an expense write has no budget to update.
    pub missing_budget_policy: MissingBudgetPolicy,

    /// The directory uploaded receipts are written to.
    pub receipts_dir: PathBuf,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// The remaining settings start at their defaults and can be changed with the builder-style
    /// methods, e.g. [AppState::with_missing_budget_policy].
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, cookie_secret: &str) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            password_hash_cost: PasswordHash::DEFAULT_COST,
            missing_budget_policy: MissingBudgetPolicy::default(),
            receipts_dir: PathBuf::from("receipts"),
            db_connection: connection,
        })
    }

    /// Set how long auth cookies stay valid without activity.
    pub fn with_cookie_duration(mut self, cookie_duration: Duration) -> Self {
        self.cookie_duration = cookie_duration;
        self
    }

    /// Set the bcrypt cost for new password hashes.
    pub fn with_password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hash_cost = cost;
        self
    }

    /// Set what budget synchronization does when a budget is missing.
    pub fn with_missing_budget_policy(mut self, policy: MissingBudgetPolicy) -> Self {
        self.missing_budget_policy = policy;
        self
    }

    /// Set where uploaded receipts are stored.
    pub fn with_receipts_dir(mut self, receipts_dir: impl Into<PathBuf>) -> Self {
        self.receipts_dir = receipts_dir.into();
        self
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

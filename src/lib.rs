//! A personal finance tracker.
//!
//! Users register, log in, record incomes and expenses, and keep one budget
//! per spending category. Each budget tracks how much has been spent against
//! it, and that total is updated whenever an expense is created, edited or
//! deleted.
//!
//! This library provides a JSON API served with axum and backed by SQLite.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::{Deserialize, Serialize};
use tokio::signal;

mod app_state;
mod auth;
mod budget;
mod category;
mod database_id;
mod date_format;
mod db;
mod endpoints;
mod expense;
mod extract;
mod income;
mod logging;
mod message;
mod money;
mod profile;
mod routing;
#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_username,
    update_password,
};
pub use budget::{MissingBudgetPolicy, create_default_budgets};
pub use category::Category;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Money;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required field was missing or empty.
    #[error("missing required field \"{0}\"")]
    MissingField(&'static str),

    /// The request body could not be parsed, e.g. malformed JSON, a field
    /// with the wrong type, an unknown category or an invalid amount.
    ///
    /// The string is the parser's description of the problem and is safe to
    /// show to the client.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// A path or query parameter could not be parsed.
    #[error("invalid request parameters: {0}")]
    InvalidParameters(String),

    /// A budget limit below zero was given.
    #[error("the budget limit must be zero or greater")]
    NegativeLimit,

    /// An expense or income amount below zero was given.
    #[error("the amount must be zero or greater")]
    NegativeAmount,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The email address belongs to another user.
    #[error("the email is already in use")]
    DuplicateEmail,

    /// The username belongs to another user.
    #[error("the username is already in use")]
    DuplicateUsername,

    /// The user already has a budget for the category.
    #[error("a budget for \"{0}\" already exists")]
    DuplicateBudget(Category),

    /// An expense write needed a budget for the category but the user has
    /// none, and the sync policy is [MissingBudgetPolicy::Reject].
    #[error("no budget exists for the category \"{0}\"")]
    MissingBudget(Category),

    /// The username and password combination is wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The current password given when changing passwords is wrong.
    #[error("the current password is incorrect")]
    IncorrectPassword,

    /// A protected route was requested without a valid session.
    #[error("authentication required")]
    NotAuthenticated,

    /// Log out was requested without a valid session.
    #[error("no user is logged in")]
    NotLoggedIn,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The budget does not exist or belongs to another user.
    #[error("the budget could not be found")]
    BudgetNotFound,

    /// The income does not exist or belongs to another user.
    #[error("the income could not be found")]
    IncomeNotFound,

    /// The expense does not exist or belongs to another user.
    #[error("the expense could not be found")]
    ExpenseNotFound,

    /// The receipt upload was not a multipart form with a `receipt` file.
    #[error("invalid receipt upload: {0}")]
    InvalidReceipt(String),

    /// The route exists but not for the request's HTTP method.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The session cookie could not be created.
    #[error("could not create the auth cookie: {0}")]
    CookieError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Reading or writing a file failed.
    #[error("an I/O error occurred: {0}")]
    IoError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent with every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// A short description of what went wrong.
    pub message: String,
    /// Details about the problem, if there are any the client can act on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }

    fn with_detail(message: impl Into<String>, detail: String) -> Self {
        Self {
            message: message.into(),
            error: Some(detail),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(format!("Missing required field: {field}.")),
            ),
            Error::InvalidBody(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::with_detail("Invalid JSON.", detail),
            ),
            Error::InvalidParameters(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::with_detail("Invalid request parameters.", detail),
            ),
            Error::NegativeLimit => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Limit is required and must be ≥ 0."),
            ),
            Error::NegativeAmount => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Amount must be ≥ 0."),
            ),
            Error::TooWeak(feedback) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::with_detail("Password is too weak.", feedback),
            ),
            Error::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Email already taken."),
            ),
            Error::DuplicateUsername => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Username already taken."),
            ),
            Error::DuplicateBudget(category) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(format!("A budget for {category} already exists.")),
            ),
            Error::MissingBudget(category) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(format!("No budget exists for the category {category}.")),
            ),
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Invalid credentials."),
            ),
            Error::IncorrectPassword => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Current password is incorrect."),
            ),
            Error::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Authentication required."),
            ),
            Error::NotLoggedIn => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("User not logged in."),
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("The requested resource could not be found."),
            ),
            Error::BudgetNotFound => (StatusCode::NOT_FOUND, ErrorBody::new("Budget not found.")),
            Error::IncomeNotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("Income not found or not authorized."),
            ),
            Error::ExpenseNotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("Expense not found or not authorized."),
            ),
            Error::InvalidReceipt(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::with_detail("Invalid receipt upload.", detail),
            ),
            Error::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorBody::new("Invalid request method."),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Something went wrong."),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

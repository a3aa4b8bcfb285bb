#![allow(missing_docs)]

//! Helpers for endpoint tests that drive the full router.

use std::sync::atomic::{AtomicUsize, Ordering};

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState,
    auth::{COOKIE_TOKEN, UserID, get_user_by_username},
    budget::MissingBudgetPolicy,
    database_id::DatabaseId,
    endpoints,
    message::Message,
    routing::build_router,
};

/// A password strong enough to pass registration.
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// The lowest cost bcrypt accepts, to keep the tests fast.
const TEST_HASH_COST: u32 = 4;

static NEXT_SERVER_ID: AtomicUsize = AtomicUsize::new(0);

/// Create a test server with an in-memory database and the default sync policy.
pub fn get_test_server() -> (TestServer, AppState) {
    get_test_server_with_policy(MissingBudgetPolicy::default())
}

/// Create a test server with an in-memory database and the given sync policy.
///
/// Each server writes receipts to its own temporary directory.
pub fn get_test_server_with_policy(policy: MissingBudgetPolicy) -> (TestServer, AppState) {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    let receipts_dir = std::env::temp_dir().join(format!(
        "finance_tracker_receipts_{}_{}",
        std::process::id(),
        NEXT_SERVER_ID.fetch_add(1, Ordering::Relaxed)
    ));
    let state = AppState::new(connection, "foobar")
        .expect("Could not create app state.")
        .with_password_hash_cost(TEST_HASH_COST)
        .with_missing_budget_policy(policy)
        .with_receipts_dir(receipts_dir);
    let server =
        TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

    (server, state)
}

/// Register `name` with the email `{name}@example.com` and [TEST_PASSWORD].
pub async fn register(server: &TestServer, name: &str) {
    server
        .post(endpoints::REGISTER)
        .json(&json!({
            "name": name,
            "email": format!("{name}@example.com"),
            "password": TEST_PASSWORD,
        }))
        .await
        .assert_status_ok();
}

/// Register `name` and return their session cookie.
pub async fn register_and_log_in(server: &TestServer, name: &str) -> Cookie<'static> {
    register(server, name).await;

    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({"name": name, "password": TEST_PASSWORD}))
        .await;
    response.assert_status_ok();

    response.cookie(COOKIE_TOKEN)
}

#[track_caller]
pub fn user_id_of(state: &AppState, name: &str) -> UserID {
    let connection = state.db_connection.lock().unwrap();

    get_user_by_username(name, &connection)
        .expect("Could not find user.")
        .id
}

/// Create an expense through the API and return its ID.
pub async fn create_test_expense(
    server: &TestServer,
    cookie: &Cookie<'static>,
    name: &str,
    amount: i64,
    category: &str,
    date: &str,
) -> DatabaseId {
    let response = server
        .post(endpoints::EXPENSES)
        .add_cookie(cookie.clone())
        .json(&json!({
            "name": name,
            "amount": amount,
            "category": category,
            "date": date,
        }))
        .await;
    response.assert_status_ok();

    response
        .json::<Message>()
        .id
        .expect("Creating an expense should return its ID.")
}

/// Create an income of 100 from "Work" through the API and return its ID.
pub async fn create_test_income(
    server: &TestServer,
    cookie: &Cookie<'static>,
    name: &str,
    date: &str,
) -> DatabaseId {
    let response = server
        .post(endpoints::INCOMES)
        .add_cookie(cookie.clone())
        .json(&json!({
            "name": name,
            "amount": 100,
            "source": "Work",
            "date": date,
        }))
        .await;
    response.assert_status_ok();

    response
        .json::<Message>()
        .id
        .expect("Creating an income should return its ID.")
}

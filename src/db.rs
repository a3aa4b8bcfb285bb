//! Creates the application's database schema.

use rusqlite::Connection;

use crate::{
    Error, budget::create_budget_table, expense::create_expense_table,
    income::create_income_table, auth::create_user_table,
};

/// Create the all of the database tables for the application.
///
/// Foreign keys are switched on for `connection` so that deleting a user
/// removes their budgets, expenses and incomes. Tables that already exist are
/// left untouched, so this is safe to call every time the server starts.
///
/// # Errors
/// This function may return a [Error::SqlError] if something went wrong
/// creating the tables.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_income_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

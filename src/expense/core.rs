//! Expense storage and the writes that keep budgets in step with it.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    budget::{
        ExpenseEntry, MissingBudgetPolicy, sync_expense_created, sync_expense_deleted,
        sync_expense_updated,
    },
    category::Category,
    database_id::ExpenseId,
    extract::require_text,
    money::Money,
};

// ============================================================================
// MODELS
// ============================================================================

/// Money a user spent on something.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub id: ExpenseId,
    #[serde(skip)]
    pub user_id: UserID,
    /// What the money was spent on.
    pub name: String,
    pub amount: Money,
    pub category: Category,
    #[serde(with = "crate::date_format")]
    pub date: Date,
    pub notes: String,
    /// Where the uploaded receipt was saved, if there is one.
    pub receipt: Option<String>,
}

impl Expense {
    fn entry(&self) -> ExpenseEntry {
        ExpenseEntry {
            category: self.category,
            amount: self.amount,
        }
    }
}

/// The fields a client sends to create or replace an expense.
///
/// An absent name defaults to empty so that it is reported as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseData {
    #[serde(default)]
    pub name: String,
    pub amount: Money,
    pub category: Category,
    #[serde(with = "crate::date_format")]
    pub date: Date,
    #[serde(default)]
    pub notes: String,
}

impl ExpenseData {
    /// Trim the text fields and check the values the parser cannot.
    ///
    /// # Errors
    /// Returns [Error::MissingField] if the name is blank or
    /// [Error::NegativeAmount] if the amount is below zero.
    pub fn validate(self) -> Result<Self, Error> {
        let name = require_text(&self.name, "name")?.to_owned();

        if self.amount.is_negative() {
            return Err(Error::NegativeAmount);
        }

        Ok(Self {
            name,
            notes: self.notes.trim().to_owned(),
            ..self
        })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the expense table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                amount INTEGER NOT NULL CHECK (amount >= 0),
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                receipt TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_category ON expense(user_id, category)",
        (),
    )?;

    Ok(())
}

const EXPENSE_COLUMNS: &str = "id, user_id, name, amount, category, date, notes, receipt";

fn map_row_to_expense(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        date: row.get(5)?,
        notes: row.get(6)?,
        receipt: row.get(7)?,
    })
}

fn map_expense_error(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::ExpenseNotFound,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::NotFound,
        error => error.into(),
    }
}

fn insert_expense(
    user_id: UserID,
    data: &ExpenseData,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO expense (user_id, name, amount, category, date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                &data.name,
                data.amount,
                data.category,
                data.date,
                &data.notes,
            ),
            map_row_to_expense,
        )
        .map_err(map_expense_error)
}

/// Retrieve the expense `id` if it belongs to `user_id`.
///
/// # Errors
/// Returns [Error::ExpenseNotFound] if there is no such expense or another
/// user owns it.
pub fn get_expense(
    id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_one((id, user_id.as_i64()), map_row_to_expense)
        .map_err(map_expense_error)
}

/// Retrieve the expenses of `user_id`, newest first.
pub fn get_user_expenses(user_id: UserID, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE user_id = ?1 ORDER BY date DESC, id DESC"
        ))?
        .query_map([user_id.as_i64()], map_row_to_expense)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Save a new expense for `user_id` and add it to the budget for its category.
///
/// The expense is only kept if its budget could be updated.
///
/// # Errors
/// This function will return a:
/// - [Error::MissingBudget] if there is no budget for the category under
///   [MissingBudgetPolicy::Reject],
/// - [Error::NotFound] if `user_id` does not refer to a user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn record_expense(
    user_id: UserID,
    data: &ExpenseData,
    policy: MissingBudgetPolicy,
    connection: &Connection,
) -> Result<Expense, Error> {
    let transaction = connection.unchecked_transaction()?;

    let expense = insert_expense(user_id, data, &transaction)?;
    sync_expense_created(user_id, expense.entry(), policy, &transaction)?;

    transaction.commit()?;

    Ok(expense)
}

/// Replace the fields of the expense `id` owned by `user_id` and move its
/// amount between budgets as needed.
///
/// The receipt, if any, is kept.
///
/// # Errors
/// This function will return a:
/// - [Error::ExpenseNotFound] if the expense does not exist or another user
///   owns it,
/// - [Error::MissingBudget] if a budget the change touches is missing under
///   [MissingBudgetPolicy::Reject],
/// - or [Error::SqlError] if there is some other SQL error.
pub fn edit_expense(
    id: ExpenseId,
    user_id: UserID,
    data: &ExpenseData,
    policy: MissingBudgetPolicy,
    connection: &Connection,
) -> Result<Expense, Error> {
    let transaction = connection.unchecked_transaction()?;

    let before = get_expense(id, user_id, &transaction)?;
    let after = transaction
        .prepare(&format!(
            "UPDATE expense
             SET name = ?1, amount = ?2, category = ?3, date = ?4, notes = ?5
             WHERE id = ?6 AND user_id = ?7
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            (
                &data.name,
                data.amount,
                data.category,
                data.date,
                &data.notes,
                id,
                user_id.as_i64(),
            ),
            map_row_to_expense,
        )
        .map_err(map_expense_error)?;
    sync_expense_updated(user_id, before.entry(), after.entry(), policy, &transaction)?;

    transaction.commit()?;

    Ok(after)
}

/// Delete the expense `id` owned by `user_id` and take it off its budget.
///
/// Returns the deleted expense so its receipt can be cleaned up.
///
/// # Errors
/// This function will return a:
/// - [Error::ExpenseNotFound] if the expense does not exist or another user
///   owns it,
/// - [Error::MissingBudget] if the budget is missing under
///   [MissingBudgetPolicy::Reject],
/// - or [Error::SqlError] if there is some other SQL error.
pub fn remove_expense(
    id: ExpenseId,
    user_id: UserID,
    policy: MissingBudgetPolicy,
    connection: &Connection,
) -> Result<Expense, Error> {
    let transaction = connection.unchecked_transaction()?;

    let deleted = transaction
        .prepare(&format!(
            "DELETE FROM expense WHERE id = ?1 AND user_id = ?2 RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row((id, user_id.as_i64()), map_row_to_expense)
        .map_err(map_expense_error)?;
    sync_expense_deleted(user_id, deleted.entry(), policy, &transaction)?;

    transaction.commit()?;

    Ok(deleted)
}

/// Record where the receipt for the expense `id` owned by `user_id` was saved.
///
/// # Errors
/// Returns [Error::ExpenseNotFound] if the expense does not exist or another
/// user owns it.
pub fn set_receipt(
    id: ExpenseId,
    user_id: UserID,
    receipt: &str,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "UPDATE expense SET receipt = ?1 WHERE id = ?2 AND user_id = ?3
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row((receipt, id, user_id.as_i64()), map_row_to_expense)
        .map_err(map_expense_error)
}

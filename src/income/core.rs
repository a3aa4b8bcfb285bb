//! Income storage.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, auth::UserID, database_id::IncomeId, extract::require_text, money::Money,
};

/// Money a user earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Income {
    pub id: IncomeId,
    #[serde(skip)]
    pub user_id: UserID,
    pub name: String,
    pub amount: Money,
    /// Where the money came from, e.g. an employer.
    pub source: String,
    #[serde(with = "crate::date_format")]
    pub date: Date,
    pub notes: String,
}

/// The fields a client sends to create or replace an income.
///
/// Absent text fields default to empty so that they are reported as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeData {
    #[serde(default)]
    pub name: String,
    pub amount: Money,
    #[serde(default)]
    pub source: String,
    #[serde(with = "crate::date_format")]
    pub date: Date,
    #[serde(default)]
    pub notes: String,
}

impl IncomeData {
    /// Trim the text fields and check the values the parser cannot.
    ///
    /// # Errors
    /// Returns [Error::MissingField] if the name or source is blank or
    /// [Error::NegativeAmount] if the amount is below zero.
    pub fn validate(self) -> Result<Self, Error> {
        let name = require_text(&self.name, "name")?.to_owned();
        let source = require_text(&self.source, "source")?.to_owned();

        if self.amount.is_negative() {
            return Err(Error::NegativeAmount);
        }

        Ok(Self {
            name,
            source,
            notes: self.notes.trim().to_owned(),
            ..self
        })
    }
}

/// Create the income table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_income_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS income (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                amount INTEGER NOT NULL CHECK (amount >= 0),
                source TEXT NOT NULL,
                date TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

const INCOME_COLUMNS: &str = "id, user_id, name, amount, source, date, notes";

fn map_row_to_income(row: &Row) -> Result<Income, rusqlite::Error> {
    Ok(Income {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        amount: row.get(3)?,
        source: row.get(4)?,
        date: row.get(5)?,
        notes: row.get(6)?,
    })
}

fn map_income_error(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::IncomeNotFound,
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

/// Save a new income for `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if `user_id` does not refer to a user or
/// [Error::SqlError] if there is some other SQL error.
pub fn create_income(
    user_id: UserID,
    data: &IncomeData,
    connection: &Connection,
) -> Result<Income, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO income (user_id, name, amount, source, date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {INCOME_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                &data.name,
                data.amount,
                &data.source,
                data.date,
                &data.notes,
            ),
            map_row_to_income,
        )
        .map_err(map_income_error)
}

/// Retrieve the income `id` if it belongs to `user_id`.
///
/// # Errors
/// Returns [Error::IncomeNotFound] if there is no such income or another user
/// owns it.
pub fn get_income(id: IncomeId, user_id: UserID, connection: &Connection) -> Result<Income, Error> {
    connection
        .prepare(&format!(
            "SELECT {INCOME_COLUMNS} FROM income WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_one((id, user_id.as_i64()), map_row_to_income)
        .map_err(map_income_error)
}

/// Retrieve every user's incomes in the order they were created.
pub fn get_all_incomes(connection: &Connection) -> Result<Vec<Income>, Error> {
    connection
        .prepare(&format!("SELECT {INCOME_COLUMNS} FROM income ORDER BY id"))?
        .query_map([], map_row_to_income)?
        .map(|maybe_income| maybe_income.map_err(Error::from))
        .collect()
}

/// Retrieve the incomes of `user_id`, newest first.
pub fn get_user_incomes(user_id: UserID, connection: &Connection) -> Result<Vec<Income>, Error> {
    connection
        .prepare(&format!(
            "SELECT {INCOME_COLUMNS} FROM income WHERE user_id = ?1 ORDER BY date DESC, id DESC"
        ))?
        .query_map([user_id.as_i64()], map_row_to_income)?
        .map(|maybe_income| maybe_income.map_err(Error::from))
        .collect()
}

/// Replace the fields of the income `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::IncomeNotFound] if there is no such income or another user
/// owns it.
pub fn update_income(
    id: IncomeId,
    user_id: UserID,
    data: &IncomeData,
    connection: &Connection,
) -> Result<Income, Error> {
    connection
        .prepare(&format!(
            "UPDATE income SET name = ?1, amount = ?2, source = ?3, date = ?4, notes = ?5
             WHERE id = ?6 AND user_id = ?7
             RETURNING {INCOME_COLUMNS}"
        ))?
        .query_row(
            (
                &data.name,
                data.amount,
                &data.source,
                data.date,
                &data.notes,
                id,
                user_id.as_i64(),
            ),
            map_row_to_income,
        )
        .map_err(map_income_error)
}

/// Delete the income `id` owned by `user_id`.
///
/// # Errors
/// Returns [Error::IncomeNotFound] if there is no such income or another user
/// owns it.
pub fn delete_income(id: IncomeId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM income WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::IncomeNotFound);
    }

    Ok(())
}

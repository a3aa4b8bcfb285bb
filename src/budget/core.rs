//! Budget storage: one spending limit and running total per user and category.

use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{
    Error,
    auth::UserID,
    category::Category,
    database_id::BudgetId,
    money::Money,
};

/// A user's spending limit for one category and how much they have spent so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user who owns the budget.
    #[serde(skip)]
    pub user_id: UserID,
    /// The category the budget applies to.
    pub category: Category,
    /// How much the user plans to spend at most.
    pub limit: Money,
    /// The total of the user's expenses in the category.
    pub spent: Money,
}

/// A budget along with the name of the user that owns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetWithOwner {
    pub id: BudgetId,
    pub user_id: UserID,
    pub username: String,
    pub category: Category,
    pub limit: Money,
    pub spent: Money,
}

/// Create the budget table.
///
/// Amounts are stored as whole cents. A user has at most one budget per
/// category, and their budgets are deleted along with them.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                \"limit\" INTEGER NOT NULL CHECK (\"limit\" >= 0),
                spent INTEGER NOT NULL DEFAULT 0,
                UNIQUE(user_id, category),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Budget].
///
/// Expects the columns id, user_id, category, limit and spent in that order.
pub fn map_row_to_budget(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        limit: row.get(3)?,
        spent: row.get(4)?,
    })
}

fn map_budget_write_error(error: rusqlite::Error, category: Category) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateBudget(category),
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::NotFound,
        rusqlite::Error::QueryReturnedNoRows => Error::BudgetNotFound,
        error => error.into(),
    }
}

/// Create a budget for `user_id` in `category`.
///
/// The amount spent starts at the total of the user's existing expenses in
/// `category`, which is zero for a new user.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeLimit] if `limit` is below zero,
/// - [Error::DuplicateBudget] if the user already has a budget for `category`,
/// - [Error::NotFound] if `user_id` does not refer to a user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(
    user_id: UserID,
    category: Category,
    limit: Money,
    connection: &Connection,
) -> Result<Budget, Error> {
    if limit.is_negative() {
        return Err(Error::NegativeLimit);
    }

    connection
        .prepare(
            "INSERT INTO budget (user_id, category, \"limit\", spent)
             VALUES (
                ?1, ?2, ?3,
                (SELECT COALESCE(SUM(amount), 0) FROM expense WHERE user_id = ?1 AND category = ?2)
             )
             RETURNING id, user_id, category, \"limit\", spent",
        )?
        .query_row((user_id.as_i64(), category, limit), map_row_to_budget)
        .map_err(|error| map_budget_write_error(error, category))
}

/// Give `user_id` a budget with a zero limit for every category.
///
/// # Errors
/// Returns the first error from [create_budget], e.g. if the user already has
/// some budgets.
pub fn create_default_budgets(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    Category::ALL
        .into_iter()
        .map(|category| create_budget(user_id, category, Money::ZERO, connection))
        .collect()
}

/// Retrieve the budget `id` if it belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::BudgetNotFound] if there is no such budget or another user owns it,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, \"limit\", spent FROM budget
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_row_to_budget,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::BudgetNotFound,
            error => error.into(),
        })
}

/// Retrieve the budget `user_id` has for `category`.
///
/// # Errors
/// This function will return a:
/// - [Error::BudgetNotFound] if the user has no budget for `category`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_budget_by_category(
    user_id: UserID,
    category: Category,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, \"limit\", spent FROM budget
             WHERE user_id = ?1 AND category = ?2",
        )?
        .query_one((user_id.as_i64(), category), map_row_to_budget)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::BudgetNotFound,
            error => error.into(),
        })
}

/// Retrieve every budget belonging to `user_id`, oldest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_user_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, \"limit\", spent FROM budget
             WHERE user_id = :user_id ORDER BY id",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row_to_budget)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Retrieve the budgets of every user.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_budgets(connection: &Connection) -> Result<Vec<BudgetWithOwner>, Error> {
    connection
        .prepare(
            "SELECT budget.id, budget.user_id, user.username, budget.category,
                    budget.\"limit\", budget.spent
             FROM budget INNER JOIN user ON user.id = budget.user_id
             ORDER BY budget.id",
        )?
        .query_map([], |row| {
            Ok(BudgetWithOwner {
                id: row.get(0)?,
                user_id: UserID::new(row.get(1)?),
                username: row.get(2)?,
                category: row.get(3)?,
                limit: row.get(4)?,
                spent: row.get(5)?,
            })
        })?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Change the category and/or limit of the budget `id` owned by `user_id`.
///
/// Fields that are `None` keep their current value. If the category changes,
/// the amount spent is recomputed from the user's expenses in the new
/// category.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeLimit] if `limit` is below zero,
/// - [Error::BudgetNotFound] if there is no such budget or another user owns it,
/// - [Error::DuplicateBudget] if the user already has a budget for `category`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    id: BudgetId,
    user_id: UserID,
    category: Option<Category>,
    limit: Option<Money>,
    connection: &Connection,
) -> Result<Budget, Error> {
    if limit.is_some_and(|limit| limit.is_negative()) {
        return Err(Error::NegativeLimit);
    }

    let current = get_budget(id, user_id, connection)?;
    let category = category.unwrap_or(current.category);
    let limit = limit.unwrap_or(current.limit);

    connection
        .prepare(
            "UPDATE budget
             SET category = ?1,
                 \"limit\" = ?2,
                 spent = CASE
                     WHEN category = ?1 THEN spent
                     ELSE (SELECT COALESCE(SUM(amount), 0) FROM expense
                           WHERE user_id = ?4 AND category = ?1)
                 END
             WHERE id = ?3 AND user_id = ?4
             RETURNING id, user_id, category, \"limit\", spent",
        )?
        .query_row((category, limit, id, user_id.as_i64()), map_row_to_budget)
        .map_err(|error| map_budget_write_error(error, category))
}

/// Delete the budget `id` if `user_id` owns it.
///
/// Expenses in the budget's category are kept. Under
/// [MissingBudgetPolicy::Reject](crate::budget::MissingBudgetPolicy::Reject)
/// they cannot be edited or deleted until the user creates a budget for the
/// category again, which starts from their total.
///
/// # Errors
/// This function will return a:
/// - [Error::BudgetNotFound] if there is no such budget or another user owns it,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::BudgetNotFound);
    }

    Ok(())
}

type RowsAffected = usize;

/// Add `delta` to the amount spent in `user_id`'s budget for `category`.
///
/// This is a single `UPDATE` so that concurrent expense writes cannot lose
/// each other's changes. Returns the number of budgets changed, which is zero
/// if the user has no budget for `category`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn add_to_spent(
    user_id: UserID,
    category: Category,
    delta: Money,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE budget SET spent = spent + ?1 WHERE user_id = ?2 AND category = ?3",
            (delta, user_id.as_i64(), category),
        )
        .map_err(Error::from)
}

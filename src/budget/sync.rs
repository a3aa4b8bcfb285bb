//! Keeps each budget's amount spent in step with the owner's expenses.
//!
//! Every expense write calls one of the `sync_expense_*` functions inside the
//! same SQL transaction as the write itself, after the expense row has been
//! changed. The adjustments are single `UPDATE ... SET spent = spent + ?`
//! statements, so nothing is read and written back.

use clap::ValueEnum;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::UserID,
    budget::core::{add_to_spent, create_budget},
    category::Category,
    money::Money,
};

/// What to do when an expense is written in a category the user has no budget for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingBudgetPolicy {
    /// Fail the expense write with a client error and roll it back.
    #[default]
    Reject,
    /// Leave the budgets alone and log a warning.
    Skip,
    /// Create a budget with a zero limit for the category.
    Create,
}

/// The category and amount of an expense at one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpenseEntry {
    pub category: Category,
    pub amount: Money,
}

/// Add a new expense to its budget.
///
/// # Errors
/// Returns [Error::MissingBudget] under [MissingBudgetPolicy::Reject] if there
/// is no budget for the category, or [Error::SqlError] on an SQL error.
pub fn sync_expense_created(
    user_id: UserID,
    created: ExpenseEntry,
    policy: MissingBudgetPolicy,
    connection: &Connection,
) -> Result<(), Error> {
    adjust_spent(user_id, created.category, created.amount, policy, connection)
}

/// Move an edited expense's amount between budgets.
///
/// If the category is unchanged the difference between the amounts is
/// applied. Otherwise the old amount is taken off the old category's budget
/// and the new amount added to the new category's budget, each under
/// `policy` on its own.
///
/// # Errors
/// Returns [Error::MissingBudget] under [MissingBudgetPolicy::Reject] if either
/// budget is missing, or [Error::SqlError] on an SQL error.
pub fn sync_expense_updated(
    user_id: UserID,
    before: ExpenseEntry,
    after: ExpenseEntry,
    policy: MissingBudgetPolicy,
    connection: &Connection,
) -> Result<(), Error> {
    if before.category == after.category {
        return adjust_spent(
            user_id,
            after.category,
            after.amount - before.amount,
            policy,
            connection,
        );
    }

    adjust_spent(user_id, before.category, -before.amount, policy, connection)?;
    adjust_spent(user_id, after.category, after.amount, policy, connection)
}

/// Take a deleted expense off its budget.
///
/// # Errors
/// Returns [Error::MissingBudget] under [MissingBudgetPolicy::Reject] if there
/// is no budget for the category, or [Error::SqlError] on an SQL error.
pub fn sync_expense_deleted(
    user_id: UserID,
    deleted: ExpenseEntry,
    policy: MissingBudgetPolicy,
    connection: &Connection,
) -> Result<(), Error> {
    adjust_spent(user_id, deleted.category, -deleted.amount, policy, connection)
}

fn adjust_spent(
    user_id: UserID,
    category: Category,
    delta: Money,
    policy: MissingBudgetPolicy,
    connection: &Connection,
) -> Result<(), Error> {
    if add_to_spent(user_id, category, delta, connection)? > 0 {
        return Ok(());
    }

    match policy {
        MissingBudgetPolicy::Reject => Err(Error::MissingBudget(category)),
        MissingBudgetPolicy::Skip => {
            tracing::warn!(
                "User {user_id} has no budget for {category}, skipping a change of {delta} to the amount spent."
            );
            Ok(())
        }
        MissingBudgetPolicy::Create => {
            // The expense write has already happened, so the new budget's
            // total includes it.
            let budget = create_budget(user_id, category, Money::ZERO, connection)?;
            tracing::info!(
                "Created budget {} for user {user_id} in {category} with {} spent.",
                budget.id,
                budget.spent
            );
            Ok(())
        }
    }
}

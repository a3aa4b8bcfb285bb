//! Per-category budgets and the logic that keeps their totals in sync with expenses.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod sync;

pub use core::{
    Budget, BudgetWithOwner, create_budget, create_budget_table, create_default_budgets,
    get_budget, get_budget_by_category, get_user_budgets,
};
pub use create_endpoint::create_budget_endpoint;
pub use delete_endpoint::delete_budget_endpoint;
pub use edit_endpoint::{edit_budget_endpoint, update_budget_limit_endpoint};
pub use list_endpoint::{get_all_budgets_endpoint, get_user_budgets_endpoint};
pub use sync::{
    ExpenseEntry, MissingBudgetPolicy, sync_expense_created, sync_expense_deleted,
    sync_expense_updated,
};

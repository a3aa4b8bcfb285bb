//! Expenses, their receipts, and the endpoints that keep budgets up to date
//! as expenses change.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod receipt_endpoint;

pub use core::{
    Expense, ExpenseData, create_expense_table, get_expense, get_user_expenses, record_expense,
};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_endpoint::edit_expense_endpoint;
pub use list_endpoint::{get_expense_endpoint, get_user_expenses_endpoint};
pub use receipt_endpoint::upload_receipt_endpoint;

//! Incomes. Unlike expenses they have no effect on budgets.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{Income, IncomeData, create_income, create_income_table, get_user_incomes};
pub use create_endpoint::create_income_endpoint;
pub use delete_endpoint::delete_income_endpoint;
pub use edit_endpoint::edit_income_endpoint;
pub use list_endpoint::{
    get_all_incomes_endpoint, get_income_by_id_endpoint, get_user_incomes_endpoint,
};

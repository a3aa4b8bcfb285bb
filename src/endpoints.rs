//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{expense_id}', use [format_endpoint].

/// The route for registering a new user.
pub const REGISTER: &str = "/api/user/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/user/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/user/log_out";
/// The route for getting the name of the logged in user.
pub const CURRENT_USER: &str = "/api/user/me";
/// The route to get, update or delete the logged in user's profile.
pub const PROFILE: &str = "/api/profile";
/// The route to change the logged in user's password.
pub const PASSWORD: &str = "/api/profile/password";
/// The route to create a budget or list every budget.
pub const BUDGETS: &str = "/api/budgets";
/// The route to edit a budget given its ID in the request body.
pub const EDIT_BUDGET: &str = "/api/budgets/edit";
/// The route to delete a budget given its ID in the request body.
pub const DELETE_BUDGET: &str = "/api/budgets/delete";
/// The route to list the logged in user's budgets.
pub const USER_BUDGETS: &str = "/api/budgets/mine";
/// The route to change the limit of a single budget.
pub const BUDGET_LIMIT: &str = "/api/budgets/{budget_id}/limit";
/// The route to create an expense or list the logged in user's expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to get, edit or delete a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to upload a receipt for an expense.
pub const EXPENSE_RECEIPT: &str = "/api/expenses/{expense_id}/receipt";
/// The route to create an income or list every income.
pub const INCOMES: &str = "/api/incomes";
/// The route to get an income given its ID in the query string.
pub const INCOME_BY_ID: &str = "/api/incomes/by_id";
/// The route to edit an income given its ID in the request body.
pub const EDIT_INCOME: &str = "/api/incomes/edit";
/// The route to delete an income given its ID in the request body.
pub const DELETE_INCOME: &str = "/api/incomes/delete";
/// The route to list the logged in user's incomes.
pub const USER_INCOMES: &str = "/api/incomes/mine";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

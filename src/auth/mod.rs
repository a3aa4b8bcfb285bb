//! User accounts, passwords and cookie-based sessions.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register;
mod token;
mod user;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub(crate) use cookie::{invalidate_auth_cookie, set_auth_cookie};
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use register::register_user;
pub(super) use token::Token;
pub use user::{
    User, UserID, create_user, create_user_table, delete_user, get_user_by_id,
    get_user_by_username, update_password, update_profile,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub use middleware::AuthState;

#[cfg(test)]
pub use user::count_users;

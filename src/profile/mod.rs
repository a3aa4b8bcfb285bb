//! The logged in user's own account: their name, email and password, and
//! deleting the account.

mod delete_endpoint;
mod password_endpoint;
mod update_endpoint;
mod view_endpoint;

pub use delete_endpoint::delete_account_endpoint;
pub use password_endpoint::change_password_endpoint;
pub use update_endpoint::update_profile_endpoint;
pub use view_endpoint::{Profile, get_current_user_endpoint, get_profile_endpoint};

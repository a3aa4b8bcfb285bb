//! The endpoint for ending a session.

use axum_extra::extract::PrivateCookieJar;

use crate::{
    Error,
    auth::cookie::{get_token_from_cookies, invalidate_auth_cookie},
    message::Message,
};

/// Invalidate the auth cookie.
///
/// # Errors
///
/// Returns a 400 error if the request has no valid session.
pub async fn post_log_out(jar: PrivateCookieJar) -> Result<(PrivateCookieJar, Message), Error> {
    let token = get_token_from_cookies(&jar).map_err(|_| Error::NotLoggedIn)?;

    tracing::debug!("Logging out user {}", token.user_id);

    Ok((
        invalidate_auth_cookie(jar),
        Message::new("Logged out successfully."),
    ))
}

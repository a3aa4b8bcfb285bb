//! Request extractors whose rejections use the app's JSON error body.
//!
//! axum's own `Json`, `Path` and `Query` extractors reject bad input with
//! plain text responses and a mix of 400 and 422 status codes. These wrappers
//! convert every rejection into an [Error] so clients always get a 400 with
//! a JSON body.

use axum::extract::{
    FromRequest, FromRequestParts,
    rejection::{JsonRejection, PathRejection, QueryRejection},
};

use crate::Error;

/// A JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Parameters parsed from the request path.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);

/// Parameters parsed from the query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidBody(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidParameters(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidParameters(rejection.body_text())
    }
}

/// Check that a required text field is not blank.
///
/// # Errors
///
/// Returns [Error::MissingField] with `field` if `value` is empty or only
/// whitespace.
pub fn require_text<'a>(value: &'a str, field: &'static str) -> Result<&'a str, Error> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        Err(Error::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

//! Mapping application errors and redirects onto HTTP responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::error::Error;
use crate::views::Notice;

/// Error type returned by request handlers.
///
/// The wrapped error is logged once, here, and the client gets a plain-text
/// body: the reason phrase for server errors, the reason and detail for bad
/// input.
#[derive(Debug)]
pub struct AppError(Error);

impl AppError {
    /// The underlying error.
    #[must_use]
    pub fn inner(&self) -> &Error {
        &self.0
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let reason = status.canonical_reason().unwrap_or("Error");

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
            (status, reason.to_string()).into_response()
        } else {
            warn!(error = %self.0, "request rejected");
            (status, format!("{reason}: {}", self.0)).into_response()
        }
    }
}

/// `302 Found` pointing at `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Redirect to the index page.
pub(crate) fn redirect_home() -> Response {
    found("/")
}

/// Redirect to the index page with a notice for the user.
pub(crate) fn redirect_home_with(notice: Notice) -> Response {
    found(&format!("/?error={}", notice.code()))
}

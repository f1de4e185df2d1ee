use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug)]
pub struct WebError(pub anyhow::Error);

impl<E> From<E> for WebError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        {
            tracing::error!(error = ?self.0, "internal server error");
            (StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

/// Splits an error message of the form `error-key Message text` into its
/// key and its message.
pub(crate) fn expand_error<S: Into<String>>(err: S) -> (String, String) {
    let err: String = err.into();
    match err.split_once(' ') {
        Some((key, message)) => (key.to_string(), message.to_string()),
        None => (err.clone(), err),
    }
}

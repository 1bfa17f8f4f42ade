use thiserror::Error;

/// Failures talking to or decoding the remote gist document.
///
/// A missing post is not an error anywhere in this crate; repository
/// operations return `Option`/`bool` for absence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("gist transport error: {0}")]
    Transport(String),
    #[error("gist content error: {0}")]
    Decode(String),
}

/// Failures issuing or verifying the admin token. `Expired` is kept apart
/// from `Invalid` for logging; HTTP callers see both as unauthorized.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token has expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
}

use crate::deferred::Abandoned;

/// Failures of the registry auth calls.
///
/// The first three variants are domain errors that forms can address; the
/// rest are infrastructure failures and are only ever shown as "unexpected".
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("password reset link is invalid or expired")]
    InvalidResetLink,

    #[error("password does not meet the registry's requirements")]
    InvalidPassword,

    #[error("auth request was dropped before it completed")]
    Abandoned,

    #[error("registry request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("registry responded with status {status}")]
    UnexpectedStatus { status: u16 },
}

impl From<Abandoned> for AuthError {
    fn from(_: Abandoned) -> Self {
        AuthError::Abandoned
    }
}

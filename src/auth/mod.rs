//! Authentication: registry calls, the request processor, and form submission.

pub mod api;
pub mod error;
pub mod processor;
pub mod submit;

use crate::deferred::Resolver;
use std::fmt;

pub use error::AuthError;

/// Resolver carried by every auth request.
pub type AuthResolver = Resolver<(), AuthError>;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Actions handled by [`processor::AuthProcessor`]. Each one embeds the
/// resolver its submitter is awaiting.
#[derive(Debug)]
pub enum AuthRequest {
    SignIn {
        credentials: Credentials,
        resolver: AuthResolver,
    },
    SignOut {
        resolver: AuthResolver,
    },
    ResetPassword {
        email: String,
        resolver: AuthResolver,
    },
    ChangePassword {
        link: String,
        password: String,
        resolver: AuthResolver,
    },
}

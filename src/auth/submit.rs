//! Form submission over the deferred bridge, and failure classification.
//!
//! Each submit creates a fresh [`Deferred`], dispatches an [`AuthRequest`]
//! carrying its resolver, and awaits the result. Failures are classified
//! against the kinds the submitting form knows about; anything else is
//! reported and surfaces as [`FailureKind::Unexpected`].

use super::{AuthError, AuthRequest, Credentials};
use crate::deferred::Deferred;
use crate::reporting::ErrorReporter;
use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// Something that accepts actions without returning a result.
pub trait Dispatch<A> {
    fn dispatch(&self, action: A);
}

impl<A: std::fmt::Debug> Dispatch<A> for mpsc::UnboundedSender<A> {
    fn dispatch(&self, action: A) {
        // A closed channel drops the action, and with it the resolver; the
        // submitter then sees `Abandoned`.
        if let Err(e) = self.send(action) {
            tracing::warn!(action = ?e.0, "dispatch target closed");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    SignIn,
    PassReset,
    PassChange,
}

impl FormKind {
    /// The failure kinds this form has dedicated messages for.
    pub fn known_failures(self) -> &'static [FailureKind] {
        match self {
            FormKind::SignIn => &[FailureKind::InvalidCredentials],
            FormKind::PassReset => &[],
            FormKind::PassChange => &[FailureKind::InvalidResetLink, FailureKind::InvalidPassword],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidCredentials,
    InvalidResetLink,
    InvalidPassword,
    Unexpected,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::InvalidCredentials => "invalidCredentials",
            FailureKind::InvalidResetLink => "invalidResetLink",
            FailureKind::InvalidPassword => "invalidPassword",
            FailureKind::Unexpected => "unexpected",
        }
    }

    fn of(error: &AuthError) -> Option<Self> {
        match error {
            AuthError::InvalidCredentials => Some(FailureKind::InvalidCredentials),
            AuthError::InvalidResetLink => Some(FailureKind::InvalidResetLink),
            AuthError::InvalidPassword => Some(FailureKind::InvalidPassword),
            _ => None,
        }
    }
}

/// Where a form error is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorTarget {
    /// The form-wide error line.
    Form,
    Field(&'static str),
}

pub type FieldErrors = BTreeMap<ErrorTarget, &'static str>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub errors: FieldErrors,
}

impl Failure {
    fn new(kind: FailureKind, target: ErrorTarget, code: &'static str) -> Self {
        Self {
            kind,
            errors: FieldErrors::from([(target, code)]),
        }
    }

    pub fn is_unexpected(&self) -> bool {
        self.kind == FailureKind::Unexpected
    }

    pub fn form_error(&self) -> Option<&'static str> {
        self.errors.get(&ErrorTarget::Form).copied()
    }

    pub fn field_error(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(target, _)| matches!(target, ErrorTarget::Field(name) if *name == field))
            .map(|(_, code)| *code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(Failure),
}

/// Classify `error` for `form`. Errors the form does not recognise are
/// captured by `reporter` exactly once.
pub fn classify_failure(
    form: FormKind,
    error: &AuthError,
    reporter: &dyn ErrorReporter,
) -> Failure {
    let known = FailureKind::of(error).filter(|kind| form.known_failures().contains(kind));
    match (form, known) {
        (FormKind::SignIn, Some(FailureKind::InvalidCredentials)) => Failure::new(
            FailureKind::InvalidCredentials,
            ErrorTarget::Form,
            "invalidCredentials",
        ),
        (FormKind::PassChange, Some(FailureKind::InvalidResetLink)) => {
            Failure::new(FailureKind::InvalidResetLink, ErrorTarget::Form, "invalid")
        }
        (FormKind::PassChange, Some(FailureKind::InvalidPassword)) => Failure::new(
            FailureKind::InvalidPassword,
            ErrorTarget::Field("password"),
            "invalid",
        ),
        _ => {
            reporter.capture(error);
            Failure::new(FailureKind::Unexpected, ErrorTarget::Form, "unexpected")
        }
    }
}

async fn submit<D, F>(
    form: FormKind,
    dispatch: &D,
    reporter: &dyn ErrorReporter,
    request: F,
) -> Outcome
where
    D: Dispatch<AuthRequest>,
    F: FnOnce(super::AuthResolver) -> AuthRequest,
{
    let deferred = Deferred::new();
    dispatch.dispatch(request(deferred.resolver()));
    match deferred.await {
        Ok(()) => Outcome::Success,
        Err(e) => Outcome::Failure(classify_failure(form, &e, reporter)),
    }
}

pub async fn submit_sign_in<D: Dispatch<AuthRequest>>(
    dispatch: &D,
    credentials: Credentials,
    reporter: &dyn ErrorReporter,
) -> Outcome {
    submit(FormKind::SignIn, dispatch, reporter, |resolver| {
        AuthRequest::SignIn {
            credentials,
            resolver,
        }
    })
    .await
}

pub async fn submit_pass_reset<D: Dispatch<AuthRequest>>(
    dispatch: &D,
    email: String,
    reporter: &dyn ErrorReporter,
) -> Outcome {
    submit(FormKind::PassReset, dispatch, reporter, |resolver| {
        AuthRequest::ResetPassword { email, resolver }
    })
    .await
}

pub async fn submit_pass_change<D: Dispatch<AuthRequest>>(
    dispatch: &D,
    link: String,
    password: String,
    reporter: &dyn ErrorReporter,
) -> Outcome {
    submit(FormKind::PassChange, dispatch, reporter, |resolver| {
        AuthRequest::ChangePassword {
            link,
            password,
            resolver,
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::testing::RecordingReporter;
    use std::sync::Mutex;

    /// Settles each dispatched request immediately with a canned result.
    struct Immediate(Mutex<Option<Result<(), AuthError>>>);

    impl Immediate {
        fn new(result: Result<(), AuthError>) -> Self {
            Self(Mutex::new(Some(result)))
        }
    }

    impl Dispatch<AuthRequest> for Immediate {
        fn dispatch(&self, action: AuthRequest) {
            let resolver = match action {
                AuthRequest::SignIn { resolver, .. }
                | AuthRequest::SignOut { resolver }
                | AuthRequest::ResetPassword { resolver, .. }
                | AuthRequest::ChangePassword { resolver, .. } => resolver,
            };
            if let Some(result) = self.0.lock().unwrap().take() {
                resolver.settle(result);
            }
        }
    }

    /// Drops every action.
    struct BlackHole;

    impl Dispatch<AuthRequest> for BlackHole {
        fn dispatch(&self, _action: AuthRequest) {}
    }

    fn credentials() -> Credentials {
        Credentials {
            username: "ada".into(),
            password: "pw".into(),
        }
    }

    #[test]
    fn test_known_sign_in_failure() {
        let reporter = RecordingReporter::default();
        let failure = classify_failure(FormKind::SignIn, &AuthError::InvalidCredentials, &reporter);
        assert!(!failure.is_unexpected());
        assert_eq!(failure.kind.as_str(), "invalidCredentials");
        assert_eq!(failure.form_error(), Some("invalidCredentials"));
        assert_eq!(reporter.count(), 0);
    }

    #[test]
    fn test_unrelated_error_is_reported_once() {
        let reporter = RecordingReporter::default();
        let failure = classify_failure(
            FormKind::SignIn,
            &AuthError::UnexpectedStatus { status: 504 },
            &reporter,
        );
        assert_eq!(failure.kind.as_str(), "unexpected");
        assert_eq!(failure.form_error(), Some("unexpected"));
        assert_eq!(reporter.count(), 1);
        assert_eq!(
            reporter.captured.lock().unwrap()[0],
            "registry responded with status 504"
        );
    }

    #[test]
    fn test_taxonomy_is_per_form() {
        let reporter = RecordingReporter::default();
        let failure = classify_failure(FormKind::PassChange, &AuthError::InvalidCredentials, &reporter);
        assert!(failure.is_unexpected());
        let failure = classify_failure(FormKind::PassReset, &AuthError::InvalidResetLink, &reporter);
        assert!(failure.is_unexpected());
        assert_eq!(reporter.count(), 2);
    }

    #[test]
    fn test_pass_change_field_mapping() {
        let reporter = RecordingReporter::default();
        let failure = classify_failure(FormKind::PassChange, &AuthError::InvalidPassword, &reporter);
        assert_eq!(failure.kind, FailureKind::InvalidPassword);
        assert_eq!(failure.field_error("password"), Some("invalid"));
        assert_eq!(failure.form_error(), None);

        let failure = classify_failure(FormKind::PassChange, &AuthError::InvalidResetLink, &reporter);
        assert_eq!(failure.form_error(), Some("invalid"));
        assert_eq!(reporter.count(), 0);
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let reporter = RecordingReporter::default();
        let outcome = submit_sign_in(&Immediate::new(Ok(())), credentials(), &reporter).await;
        assert_eq!(outcome, Outcome::Success);
    }

    #[tokio::test]
    async fn test_sign_in_rejected() {
        let reporter = RecordingReporter::default();
        let dispatch = Immediate::new(Err(AuthError::InvalidCredentials));
        let outcome = submit_sign_in(&dispatch, credentials(), &reporter).await;
        match outcome {
            Outcome::Failure(f) => assert_eq!(f.kind, FailureKind::InvalidCredentials),
            Outcome::Success => panic!("expected failure"),
        }
        assert_eq!(reporter.count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_request_is_unexpected() {
        let reporter = RecordingReporter::default();
        let outcome = submit_pass_reset(&BlackHole, "ada@example.com".into(), &reporter).await;
        match outcome {
            Outcome::Failure(f) => assert!(f.is_unexpected()),
            Outcome::Success => panic!("expected failure"),
        }
        assert_eq!(reporter.count(), 1);
    }

    #[tokio::test]
    async fn test_submit_through_channel() {
        let reporter = RecordingReporter::default();
        let (tx, mut rx) = mpsc::unbounded_channel::<AuthRequest>();
        tokio::spawn(async move {
            if let Some(AuthRequest::ChangePassword { resolver, .. }) = rx.recv().await {
                resolver.reject(AuthError::InvalidPassword);
            }
        });
        let outcome = submit_pass_change(&tx, "link".into(), "short".into(), &reporter).await;
        match outcome {
            Outcome::Failure(f) => assert_eq!(f.field_error("password"), Some("invalid")),
            Outcome::Success => panic!("expected failure"),
        }
    }
}

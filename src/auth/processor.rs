//! Processes [`AuthRequest`]s and settles their resolvers.
//!
//! Session changes are published as [`AppEvent::SessionChanged`] before the
//! resolver is settled, so the main loop sees the new session no later than
//! the submit result. Failed requests are not retried.

use super::api::AuthApi;
use super::{AuthRequest, AuthResolver};
use crate::app::event::AppEvent;
use tokio::sync::mpsc;

pub struct AuthProcessor<A> {
    api: A,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl<A: AuthApi + 'static> AuthProcessor<A> {
    pub fn new(api: A, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { api, event_tx }
    }

    /// Start processing in the background. Requests are handled one at a
    /// time until every sender is dropped.
    pub fn spawn(self) -> mpsc::UnboundedSender<AuthRequest> {
        let (tx, mut rx) = mpsc::unbounded_channel::<AuthRequest>();
        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                self.process(request).await;
            }
            tracing::debug!("auth processor stopped");
        });
        tx
    }

    pub async fn process(&self, request: AuthRequest) {
        match request {
            AuthRequest::SignIn {
                credentials,
                resolver,
            } => match self.api.sign_in(&credentials).await {
                Ok(session) => {
                    tracing::info!(username = %session.username, "signed in");
                    self.publish(AppEvent::SessionChanged(Some(session)));
                    resolver.resolve(());
                }
                Err(e) => {
                    tracing::info!(username = %credentials.username, error = %e, "sign-in failed");
                    resolver.reject(e);
                }
            },
            AuthRequest::SignOut { resolver } => {
                tracing::info!("signed out");
                self.publish(AppEvent::SessionChanged(None));
                resolver.resolve(());
            }
            AuthRequest::ResetPassword { email, resolver } => {
                let result = self.api.reset_password(&email).await;
                settle_logged(&resolver, "password reset", result);
            }
            AuthRequest::ChangePassword {
                link,
                password,
                resolver,
            } => {
                let result = self.api.change_password(&link, &password).await;
                settle_logged(&resolver, "password change", result);
            }
        }
    }

    fn publish(&self, event: AppEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::warn!("event loop gone, dropping auth event");
        }
    }
}

fn settle_logged(resolver: &AuthResolver, what: &str, result: Result<(), super::AuthError>) {
    match &result {
        Ok(()) => tracing::info!("{} succeeded", what),
        Err(e) => tracing::info!(error = %e, "{} failed", what),
    }
    resolver.settle(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, Credentials, Session};
    use crate::deferred::defer;
    use async_trait::async_trait;

    struct FakeApi;

    #[async_trait]
    impl AuthApi for FakeApi {
        async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
            if credentials.password == "hunter2" {
                Ok(Session {
                    username: credentials.username.clone(),
                    token: "tok".into(),
                })
            } else {
                Err(AuthError::InvalidCredentials)
            }
        }

        async fn reset_password(&self, _email: &str) -> Result<(), AuthError> {
            Ok(())
        }

        async fn change_password(&self, link: &str, _password: &str) -> Result<(), AuthError> {
            if link == "good" {
                Ok(())
            } else {
                Err(AuthError::InvalidResetLink)
            }
        }
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            username: "ada".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_publishes_session_then_resolves() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let processor = AuthProcessor::new(FakeApi, event_tx);
        let deferred = defer();
        processor
            .process(AuthRequest::SignIn {
                credentials: credentials("hunter2"),
                resolver: deferred.resolver(),
            })
            .await;
        assert!(deferred.await.is_ok());
        match event_rx.try_recv() {
            Ok(AppEvent::SessionChanged(Some(session))) => assert_eq!(session.username, "ada"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_sign_in_rejects_without_session() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let processor = AuthProcessor::new(FakeApi, event_tx);
        let deferred = defer();
        processor
            .process(AuthRequest::SignIn {
                credentials: credentials("nope"),
                resolver: deferred.resolver(),
            })
            .await;
        assert!(matches!(deferred.await, Err(AuthError::InvalidCredentials)));
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_spawned_processor_settles_requests() {
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let requests = AuthProcessor::new(FakeApi, event_tx).spawn();
        let deferred = defer();
        requests
            .send(AuthRequest::ChangePassword {
                link: "stale".into(),
                password: "pw".into(),
                resolver: deferred.resolver(),
            })
            .unwrap();
        assert!(matches!(deferred.await, Err(AuthError::InvalidResetLink)));
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let processor = AuthProcessor::new(FakeApi, event_tx);
        let deferred = defer();
        processor
            .process(AuthRequest::SignOut {
                resolver: deferred.resolver(),
            })
            .await;
        assert!(deferred.await.is_ok());
        assert!(matches!(
            event_rx.try_recv(),
            Ok(AppEvent::SessionChanged(None))
        ));
    }
}

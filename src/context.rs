//! Services shared by the main loop and the tasks it spawns.

use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::state::AppState;
use crate::auth::api::RegistryClient;
use crate::auth::processor::AuthProcessor;
use crate::auth::submit::Dispatch;
use crate::auth::{submit, AuthError, AuthRequest};
use crate::config::AppConfig;
use crate::deferred::Deferred;
use crate::reporting::{ErrorReporter, TracingReporter};
use crate::s3::signer::PublicSigner;
use crate::s3::store::FsStore;
use crate::s3::{ObjectStore, Signer};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn ObjectStore>,
    pub signer: Arc<dyn Signer>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub auth: mpsc::UnboundedSender<AuthRequest>,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
    pub preview_bytes: usize,
}

impl AppContext {
    /// Build the services described by `config` and start the auth processor.
    pub fn from_config(
        config: &AppConfig,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<Self> {
        let root = crate::config::expand_home(&config.storage.root);
        let store = Arc::new(FsStore::new(root));
        let signer: Arc<dyn Signer> = match &config.storage.download_endpoint {
            Some(endpoint) => Arc::new(
                PublicSigner::new(endpoint)
                    .with_context(|| format!("Invalid download endpoint {:?}", endpoint))?,
            ),
            None => store.clone(),
        };
        let client =
            RegistryClient::new(&config.registry).context("Failed to build registry client")?;
        let auth = AuthProcessor::new(client, event_tx.clone()).spawn();

        Ok(Self {
            store,
            signer,
            reporter: Arc::new(TracingReporter),
            auth,
            event_tx,
            preview_bytes: config.browse.preview_bytes,
        })
    }

    /// Carry out `action`. Background work reports back through `event_tx`.
    pub fn execute(&self, state: &mut AppState, action: Action) {
        tracing::debug!(?action, "executing");
        match action {
            Action::SubmitSignIn { credentials } => {
                self.spawn_submit(submit::FormKind::SignIn, move |ctx| async move {
                    submit::submit_sign_in(&ctx.auth, credentials, ctx.reporter.as_ref()).await
                });
            }
            Action::SubmitPassReset { email } => {
                self.spawn_submit(submit::FormKind::PassReset, move |ctx| async move {
                    submit::submit_pass_reset(&ctx.auth, email, ctx.reporter.as_ref()).await
                });
            }
            Action::SubmitPassChange { link, password } => {
                self.spawn_submit(submit::FormKind::PassChange, move |ctx| async move {
                    submit::submit_pass_change(&ctx.auth, link, password, ctx.reporter.as_ref())
                        .await
                });
            }
            Action::SignOut => {
                let deferred = Deferred::<(), AuthError>::new();
                self.auth.dispatch(AuthRequest::SignOut {
                    resolver: deferred.resolver(),
                });
                tokio::spawn(async move {
                    if let Err(e) = deferred.await {
                        tracing::warn!(error = %e, "sign-out did not complete");
                    }
                });
            }
            Action::LoadBuckets => {
                let ctx = self.clone();
                tokio::spawn(async move {
                    let result = ctx.store.buckets().await.map_err(|e| e.to_string());
                    ctx.send(AppEvent::BucketsLoaded(result));
                });
            }
            Action::LoadListing { bucket, prefix } => {
                let ctx = self.clone();
                tokio::spawn(async move {
                    let result = ctx
                        .store
                        .list(&bucket, &prefix)
                        .await
                        .map_err(|e| e.to_string());
                    ctx.send(AppEvent::ListingLoaded {
                        bucket,
                        prefix,
                        result,
                    });
                });
            }
            Action::LoadPreview { handle } => {
                let ctx = self.clone();
                tokio::spawn(async move {
                    let result = ctx
                        .store
                        .preview(&handle, ctx.preview_bytes)
                        .await
                        .map_err(|e| e.to_string());
                    ctx.send(AppEvent::PreviewLoaded { handle, result });
                });
            }
            Action::LoadReadme { handle } => {
                let ctx = self.clone();
                tokio::spawn(async move {
                    let result = ctx
                        .store
                        .preview(&handle, ctx.preview_bytes)
                        .await
                        .map_err(|e| e.to_string());
                    ctx.send(AppEvent::ReadmeLoaded { handle, result });
                });
            }
            Action::ResolveDownload { handle } => {
                state.status_message = Some(match self.signer.signed_s3_url(&handle) {
                    Ok(url) => format!("Download: {}", url),
                    Err(e) => {
                        tracing::warn!(%handle, error = %e, "could not sign download");
                        format!("Download failed: {}", e)
                    }
                });
                state.dirty = true;
            }
            Action::Quit => {
                state.should_quit = true;
            }
        }
    }

    fn spawn_submit<F, Fut>(&self, form: submit::FormKind, run: F)
    where
        F: FnOnce(AppContext) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = submit::Outcome> + Send,
    {
        let ctx = self.clone();
        tokio::spawn(async move {
            let tx = ctx.event_tx.clone();
            let outcome = run(ctx).await;
            if tx.send(AppEvent::FormSettled { form, outcome }).is_err() {
                tracing::debug!(?form, "event loop gone before submit settled");
            }
        });
    }

    fn send(&self, event: AppEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::debug!("event loop gone, dropping store result");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::submit::{FailureKind, FormKind, Outcome};
    use crate::auth::Credentials;
    use crate::s3::S3Handle;
    use std::fs;

    /// Context over a temporary store, with auth requests captured.
    fn context(
        root: &std::path::Path,
    ) -> (
        AppContext,
        mpsc::UnboundedReceiver<AppEvent>,
        mpsc::UnboundedReceiver<AuthRequest>,
    ) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (auth, auth_rx) = mpsc::unbounded_channel();
        let store = Arc::new(FsStore::new(root));
        let ctx = AppContext {
            store: store.clone(),
            signer: store,
            reporter: Arc::new(TracingReporter),
            auth,
            event_tx,
            preview_bytes: 1024,
        };
        (ctx, event_rx, auth_rx)
    }

    #[tokio::test]
    async fn test_listing_is_reported_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data/raw")).unwrap();
        fs::write(dir.path().join("data/a.txt"), "hello").unwrap();
        let (ctx, mut events, _auth) = context(dir.path());
        let mut state = AppState::new(AppConfig::default());

        ctx.execute(
            &mut state,
            Action::LoadListing {
                bucket: "data".into(),
                prefix: "".into(),
            },
        );
        match events.recv().await {
            Some(AppEvent::ListingLoaded { bucket, result, .. }) => {
                assert_eq!(bucket, "data");
                let listing = result.unwrap();
                assert_eq!(listing.dirs, vec!["raw/".to_string()]);
                assert_eq!(listing.files.len(), 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_settles_through_auth_channel() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, mut events, mut auth) = context(dir.path());
        let mut state = AppState::new(AppConfig::default());

        ctx.execute(
            &mut state,
            Action::SubmitSignIn {
                credentials: Credentials {
                    username: "ada".into(),
                    password: "wrong".into(),
                },
            },
        );
        match auth.recv().await {
            Some(AuthRequest::SignIn { resolver, .. }) => {
                assert!(resolver.reject(AuthError::InvalidCredentials));
            }
            other => panic!("unexpected request: {:?}", other),
        }
        match events.recv().await {
            Some(AppEvent::FormSettled {
                form: FormKind::SignIn,
                outcome: Outcome::Failure(failure),
            }) => assert_eq!(failure.kind, FailureKind::InvalidCredentials),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_download_url_goes_to_status_line() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _events, _auth) = context(dir.path());
        let mut state = AppState::new(AppConfig::default());

        ctx.execute(
            &mut state,
            Action::ResolveDownload {
                handle: S3Handle::new("data", "a.txt"),
            },
        );
        let status = state.status_message.clone().unwrap();
        assert!(status.starts_with("Download: file://"), "{}", status);
        assert!(status.ends_with("/data/a.txt"));

        ctx.execute(&mut state, Action::Quit);
        assert!(state.should_quit);
    }

    #[tokio::test]
    async fn test_sign_out_goes_through_auth_channel() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _events, mut auth) = context(dir.path());
        let mut state = AppState::new(AppConfig::default());

        ctx.execute(&mut state, Action::SignOut);
        match auth.recv().await {
            Some(AuthRequest::SignOut { resolver }) => assert!(resolver.resolve(())),
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sign_out_with_processor_gone_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _events, auth) = context(dir.path());
        drop(auth);
        let mut state = AppState::new(AppConfig::default());
        ctx.execute(&mut state, Action::SignOut);
        tokio::task::yield_now().await;
    }
}

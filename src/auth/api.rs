//! Registry auth endpoints.

use super::{AuthError, Credentials, Session};
use crate::config::model::RegistryConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError>;
    async fn reset_password(&self, email: &str) -> Result<(), AuthError>;
    async fn change_password(&self, link: &str, password: &str) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Endpoint {
    Login,
    ResetPassword,
    ChangePassword,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Login => "/api/login",
            Endpoint::ResetPassword => "/api/reset_password",
            Endpoint::ChangePassword => "/api/change_password",
        }
    }
}

/// Map a registry response status to the domain error it signals.
fn check_status(endpoint: Endpoint, status: StatusCode) -> Result<(), AuthError> {
    if status.is_success() {
        return Ok(());
    }
    match (endpoint, status) {
        (Endpoint::Login, StatusCode::UNAUTHORIZED) => Err(AuthError::InvalidCredentials),
        (Endpoint::ChangePassword, StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED) => {
            Err(AuthError::InvalidResetLink)
        }
        (Endpoint::ChangePassword, StatusCode::BAD_REQUEST) => Err(AuthError::InvalidPassword),
        _ => Err(AuthError::UnexpectedStatus {
            status: status.as_u16(),
        }),
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct ResetRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct ChangeRequest<'a> {
    link: &'a str,
    password: &'a str,
}

/// [`AuthApi`] over the registry's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: String,
    http: reqwest::Client,
}

impl RegistryClient {
    pub fn new(config: &RegistryConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<reqwest::Response, AuthError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        tracing::debug!(%url, "registry request");
        let response = self.http.post(&url).json(body).send().await?;
        check_status(endpoint, response.status())?;
        Ok(response)
    }
}

#[async_trait]
impl AuthApi for RegistryClient {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let body = LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
        };
        let response = self.post(Endpoint::Login, &body).await?;
        let login: LoginResponse = response.json().await?;
        Ok(Session {
            username: credentials.username.clone(),
            token: login.token,
        })
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.post(Endpoint::ResetPassword, &ResetRequest { email })
            .await
            .map(drop)
    }

    async fn change_password(&self, link: &str, password: &str) -> Result<(), AuthError> {
        self.post(Endpoint::ChangePassword, &ChangeRequest { link, password })
            .await
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_status_mapping() {
        assert!(check_status(Endpoint::Login, StatusCode::OK).is_ok());
        assert!(matches!(
            check_status(Endpoint::Login, StatusCode::UNAUTHORIZED),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            check_status(Endpoint::Login, StatusCode::INTERNAL_SERVER_ERROR),
            Err(AuthError::UnexpectedStatus { status: 500 })
        ));
    }

    #[test]
    fn test_change_password_status_mapping() {
        assert!(matches!(
            check_status(Endpoint::ChangePassword, StatusCode::NOT_FOUND),
            Err(AuthError::InvalidResetLink)
        ));
        assert!(matches!(
            check_status(Endpoint::ChangePassword, StatusCode::UNAUTHORIZED),
            Err(AuthError::InvalidResetLink)
        ));
        assert!(matches!(
            check_status(Endpoint::ChangePassword, StatusCode::BAD_REQUEST),
            Err(AuthError::InvalidPassword)
        ));
    }

    #[test]
    fn test_reset_has_no_domain_statuses() {
        assert!(matches!(
            check_status(Endpoint::ResetPassword, StatusCode::NOT_FOUND),
            Err(AuthError::UnexpectedStatus { status: 404 })
        ));
        assert!(check_status(Endpoint::ResetPassword, StatusCode::NO_CONTENT).is_ok());
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let config = RegistryConfig {
            url: "https://registry.example.com/".into(),
            timeout_secs: 5,
        };
        let client = RegistryClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://registry.example.com");
    }
}

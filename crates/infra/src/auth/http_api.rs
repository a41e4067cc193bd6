//! HTTP implementation of the `AuthApi` port
//!
//! Both systems expose the same auth surface: `POST {base}/auth/login` with
//! the credentials body returning `{token, expiresIn?}`, and
//! `POST {base}/auth/logout` with the bearer token. A missing `expiresIn`
//! falls back to a conservative one-hour lifetime.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use syncbridge_core::AuthApi;
use syncbridge_domain::{
    Credentials, ExternalSystem, Result, SyncError, Token, DEFAULT_TOKEN_TTL_SECS,
};
use tracing::debug;

use crate::http::ResilientClient;

pub struct HttpAuthApi {
    client: ResilientClient,
    erp_base_url: String,
    crm_base_url: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(rename = "appKey")]
    app_key: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(rename = "expiresIn", default)]
    expires_in: Option<i64>,
}

impl HttpAuthApi {
    pub fn new(
        client: ResilientClient,
        erp_base_url: impl Into<String>,
        crm_base_url: impl Into<String>,
    ) -> Self {
        Self { client, erp_base_url: erp_base_url.into(), crm_base_url: crm_base_url.into() }
    }

    fn base_url(&self, system: ExternalSystem) -> &str {
        match system {
            ExternalSystem::Erp => &self.erp_base_url,
            ExternalSystem::Crm => &self.crm_base_url,
        }
    }

    fn auth_url(&self, system: ExternalSystem, action: &str) -> String {
        format!("{}/auth/{action}", self.base_url(system).trim_end_matches('/'))
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, system: ExternalSystem, credentials: &Credentials) -> Result<Token> {
        let body = LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
            app_key: &credentials.app_key,
        };

        let request = self.client.request(Method::POST, self.auth_url(system, "login")).json(&body);

        let response = self.client.send(request).await.map_err(|err| match err {
            // Any upstream rejection of a login is a credentials problem
            SyncError::Unauthorized(msg) | SyncError::ValidationFailure(msg) => {
                SyncError::AuthenticationFailure(msg)
            }
            other => other,
        })?;

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Serialization(format!("malformed login response: {e}")))?;

        let ttl = login.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        debug!(system = %system, ttl_seconds = ttl, "login succeeded");
        Ok(Token::new(login.token, system, Utc::now(), ttl))
    }

    async fn logout(&self, system: ExternalSystem, token: &Token) -> Result<()> {
        let request = self
            .client
            .request(Method::POST, self.auth_url(system, "logout"))
            .bearer_auth(&token.value);

        self.client.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client() -> ResilientClient {
        ResilientClient::builder()
            .base_backoff(std::time::Duration::from_millis(5))
            .max_attempts(2)
            .build()
            .expect("http client")
    }

    fn credentials() -> Credentials {
        Credentials { username: "sync".into(), password: "pw".into(), app_key: "key-1".into() }
    }

    #[tokio::test]
    async fn login_posts_credentials_and_parses_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json_string(r#"{"username":"sync","password":"pw","appKey":"key-1"}"#))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"token": "tok-1", "expiresIn": 1800})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpAuthApi::new(client(), server.uri(), "https://crm.invalid");
        let token = api.login(ExternalSystem::Erp, &credentials()).await.unwrap();

        assert_eq!(token.value, "tok-1");
        assert_eq!(token.system, ExternalSystem::Erp);
        let remaining = token.seconds_until_expiry(Utc::now());
        assert!(remaining > 1700 && remaining <= 1800);
    }

    #[tokio::test]
    async fn missing_expiry_defaults_to_one_hour() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok-2"})),
            )
            .mount(&server)
            .await;

        let api = HttpAuthApi::new(client(), server.uri(), "https://crm.invalid");
        let token = api.login(ExternalSystem::Erp, &credentials()).await.unwrap();

        let remaining = token.seconds_until_expiry(Utc::now());
        assert!(remaining > 3500 && remaining <= 3600);
    }

    #[tokio::test]
    async fn rejected_login_is_an_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpAuthApi::new(client(), "https://erp.invalid", server.uri());
        let err = api.login(ExternalSystem::Crm, &credentials()).await.unwrap_err();

        assert!(matches!(err, SyncError::AuthenticationFailure(_)));
    }

    #[tokio::test]
    async fn logout_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .and(wiremock::matchers::header("authorization", "Bearer tok-3"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpAuthApi::new(client(), server.uri(), "https://crm.invalid");
        let token = Token::new("tok-3".into(), ExternalSystem::Erp, Utc::now(), 3600);
        api.logout(ExternalSystem::Erp, &token).await.unwrap();
    }

    #[tokio::test]
    async fn logout_rejection_surfaces_as_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let api = HttpAuthApi::new(client(), server.uri(), "https://crm.invalid");
        let token = Token::new("tok-4".into(), ExternalSystem::Erp, Utc::now(), 3600);
        let err = api.logout(ExternalSystem::Erp, &token).await.unwrap_err();

        assert!(matches!(err, SyncError::Unauthorized(_)));
    }
}

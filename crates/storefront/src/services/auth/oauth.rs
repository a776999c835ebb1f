//! OAuth 2.0 authorization-code client (Google by default).
//!
//! The login route stores `state` and `nonce` in the session and redirects to
//! [`OAuthClient::authorization_url`]; the callback exchanges the code and
//! fetches the `OpenID` userinfo document.

use rand::Rng;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use super::AuthError;
use crate::config::OAuthConfig;

/// Token endpoint response. Only the access token is used.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// `OpenID` Connect userinfo claims.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub email: String,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// OAuth client over a shared HTTP client.
pub struct OAuthClient<'a> {
    http: &'a reqwest::Client,
    config: &'a OAuthConfig,
}

impl<'a> OAuthClient<'a> {
    #[must_use]
    pub const fn new(http: &'a reqwest::Client, config: &'a OAuthConfig) -> Self {
        Self { http, config }
    }

    /// The provider URL to send the browser to.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String {
        let separator = if self.config.authorize_url.contains('?') {
            '&'
        } else {
            '?'
        };
        format!(
            "{}{separator}client_id={}&response_type=code&redirect_uri={}&scope=openid%20email%20profile&state={}&nonce={}",
            self.config.authorize_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
            urlencoding::encode(nonce)
        )
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::OAuthProvider` if the provider rejects the code.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AuthError::OAuthProvider(format!(
                "token exchange failed ({status}): {text}"
            )));
        }

        Ok(response.json().await?)
    }

    /// Fetch the signed-in account's profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::OAuthProvider` if the request fails or the account has no email.
    #[instrument(skip_all)]
    pub async fn userinfo(&self, access_token: &str) -> Result<UserInfo, AuthError> {
        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::OAuthProvider(format!(
                "userinfo request failed ({})",
                response.status()
            )));
        }

        let info: UserInfo = response.json().await?;
        if info.email.trim().is_empty() {
            return Err(AuthError::OAuthProvider("account has no email".to_owned()));
        }
        if info.email_verified == Some(false) {
            return Err(AuthError::OAuthProvider("email not verified".to_owned()));
        }
        Ok(info)
    }
}

/// A random alphanumeric string for OAuth `state` and `nonce`.
#[must_use]
pub fn random_token(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| CHARSET.get(rng.random_range(0..CHARSET.len())))
        .map(|&b| char::from(b))
        .collect()
}

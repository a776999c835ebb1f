//! OAuth authorization-code sign-in.
//!
//! - `GET /auth/oauth/login` stores a random `state` and `nonce` in the
//!   session and redirects to the provider.
//! - `GET /auth/oauth/callback` checks `state`, exchanges the code, reads the
//!   verified email and logs the matching account in, creating it if needed.
//!
//! Failures redirect to `/login?error=...` rather than rendering an error.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, info, warn};

use crate::models::session_keys;
use crate::routes::auth::log_in;
use crate::services::auth::AuthService;
use crate::services::auth::oauth::{OAuthClient, random_token};
use crate::state::AppState;

pub(crate) const CALLBACK_PATH: &str = "/auth/oauth/callback";
const TOKEN_LENGTH: usize = 32;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

fn login_error(code: &str) -> Response {
    Redirect::to(&format!("/login?error={code}")).into_response()
}

/// `GET /auth/oauth/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let Some(oauth) = state.config().oauth.as_ref() else {
        return login_error("oauth_disabled");
    };

    let oauth_state = random_token(TOKEN_LENGTH);
    let nonce = random_token(TOKEN_LENGTH);

    let stored = async {
        session.insert(session_keys::OAUTH_STATE, &oauth_state).await?;
        session.insert(session_keys::OAUTH_NONCE, &nonce).await
    };
    if let Err(e) = stored.await {
        error!(error = %e, "Failed to store OAuth state in session");
        return login_error("session");
    }

    let redirect_uri = state.config().url_for(CALLBACK_PATH);
    let url = OAuthClient::new(state.http(), oauth).authorization_url(&redirect_uri, &oauth_state, &nonce);
    Redirect::to(&url).into_response()
}

/// `GET /auth/oauth/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(oauth) = state.config().oauth.as_ref() else {
        return login_error("oauth_disabled");
    };

    if let Some(err) = query.error {
        warn!(error = %err, description = ?query.error_description, "OAuth provider denied sign-in");
        return login_error("oauth_denied");
    }
    let Some(code) = query.code else {
        return login_error("missing_code");
    };
    let Some(returned_state) = query.state else {
        return login_error("missing_state");
    };

    let stored_state = session
        .remove::<String>(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();
    let _ = session.remove::<String>(session_keys::OAUTH_NONCE).await;

    if stored_state.as_deref() != Some(returned_state.as_str()) {
        warn!("OAuth state mismatch");
        return login_error("invalid_state");
    }

    let client = OAuthClient::new(state.http(), oauth);
    let redirect_uri = state.config().url_for(CALLBACK_PATH);
    let info = match client.exchange_code(&code, &redirect_uri).await {
        Ok(tokens) => client.userinfo(&tokens.access_token).await,
        Err(e) => Err(e),
    };
    let info = match info {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, "OAuth token exchange failed");
            return login_error("oauth_failed");
        }
    };

    let user = match AuthService::new(state.pool()).sign_in_oauth(&info).await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "OAuth account lookup failed");
            return login_error("oauth_failed");
        }
    };

    if let Err(e) = log_in(&session, &user).await {
        return e.into_response();
    }
    info!(user_id = %user.id, "User signed in with OAuth");
    Redirect::to("/").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_redirect() {
        let response = login_error("invalid_state");
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/login?error=invalid_state"
        );
    }
}

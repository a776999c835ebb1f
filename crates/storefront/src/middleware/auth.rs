//! Authentication extractors and the page access guard.
//!
//! The logged-in user lives in the session under `current_user`. Handlers
//! ask for it through [`RequireAuth`], [`OptionalAuth`] or [`RequireAdmin`];
//! [`access_guard_middleware`] enforces the same rules by path prefix so
//! whole sections are protected without each handler opting in.

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Where anonymous visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Extractor that requires a logged-in user.
///
/// Pages redirect to the login page; `/api/*` paths get a 401 JSON body.
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a logged-in admin.
///
/// Anonymous visitors are treated as in [`RequireAuth`]; customers are sent
/// home, or get a 403 on `/api/*` paths.
pub struct RequireAdmin(pub CurrentUser);

/// Why an auth extractor rejected the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for page requests).
    RedirectToLogin,
    /// 401 JSON (for API requests).
    Unauthorized,
    /// Logged in, but not an admin.
    Forbidden { api: bool },
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Authentication required" })),
            )
                .into_response(),
            Self::Forbidden { api: true } => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Admin access required" })),
            )
                .into_response(),
            Self::Forbidden { api: false } => Redirect::to("/").into_response(),
        }
    }
}

fn is_api(parts: &Parts) -> bool {
    parts.uri.path().starts_with("/api/")
}

async fn session_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        match session_user(session).await {
            Some(user) => Ok(Self(user)),
            None if is_api(parts) => Err(AuthRejection::Unauthorized),
            None => Err(AuthRejection::RedirectToLogin),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if user.role.is_admin() {
            Ok(Self(user))
        } else {
            Err(AuthRejection::Forbidden { api: is_api(parts) })
        }
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session_user(session).await,
            None => None,
        };
        Ok(Self(user))
    }
}

/// Store the logged-in user. The session id is cycled to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Forget the logged-in user (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

/// How a path is gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathAccess {
    /// Login, registration and password reset; pointless when logged in.
    AuthPage,
    /// Needs a logged-in user.
    Protected,
    /// Needs a logged-in admin.
    Admin,
    Public,
}

const AUTH_PREFIXES: &[&str] = &["/login", "/register", "/forgot-password"];
const PROTECTED_PREFIXES: &[&str] = &["/profile", "/wishlist", "/checkout", "/dashboard"];

#[must_use]
pub fn classify_path(path: &str) -> PathAccess {
    if AUTH_PREFIXES.iter().any(|p| path.starts_with(p)) {
        PathAccess::AuthPage
    } else if path.starts_with("/admin") {
        PathAccess::Admin
    } else if PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        PathAccess::Protected
    } else {
        PathAccess::Public
    }
}

/// Redirect based on [`classify_path`] and the session user.
///
/// Logged-in users visiting auth pages go to `/`; anonymous visitors to
/// protected or admin pages go to the login page; customers visiting admin
/// pages go to `/`.
pub async fn access_guard_middleware(request: Request, next: Next) -> Response {
    let access = classify_path(request.uri().path());
    if access == PathAccess::Public {
        return next.run(request).await;
    }

    let user = match request.extensions().get::<Session>() {
        Some(session) => session_user(session).await,
        None => None,
    };

    match (access, user) {
        (PathAccess::AuthPage, Some(_)) => Redirect::to("/").into_response(),
        (PathAccess::Protected | PathAccess::Admin, None) => {
            Redirect::to(LOGIN_PATH).into_response()
        }
        (PathAccess::Admin, Some(user)) if !user.role.is_admin() => {
            Redirect::to("/").into_response()
        }
        _ => next.run(request).await,
    }
}

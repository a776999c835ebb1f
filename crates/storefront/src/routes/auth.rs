//! Email/password authentication and profile handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Put `user` in the session and tag Sentry with it.
pub(crate) async fn log_in(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &user.to_current_user())
        .await
        .map_err(AppError::internal)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// `POST /register`
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .register(
            &body.email,
            body.full_name.as_deref(),
            &body.password,
            &body.confirm_password,
        )
        .await?;

    log_in(&session, &user).await?;
    info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

/// `POST /login`
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    log_in(&session, &user).await?;
    add_breadcrumb("auth", "Logged in", None);
    Ok(Json(json!({ "user": user })))
}

/// `POST /logout`
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session)
        .await
        .map_err(AppError::internal)?;
    clear_sentry_user();
    Ok(Json(json!({ "message": "Logged out" })))
}

/// `GET /profile`
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool()).get_user(current.id).await?;
    Ok(Json(user))
}

/// `PUT /profile`
#[instrument(skip(state, session, body), fields(user_id = %current.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .update_profile(current.id, body.full_name.as_deref(), body.avatar_url.as_deref())
        .await?;

    // Keep the greeting name in the session current.
    session
        .insert(crate::models::session_keys::CURRENT_USER, user.to_current_user())
        .await
        .map_err(AppError::internal)?;
    Ok(Json(user))
}

/// `POST /forgot-password`
///
/// No mail is sent; the response is the same whether or not the account exists.
pub async fn forgot_password(Json(body): Json<ForgotPasswordRequest>) -> Result<impl IntoResponse> {
    if body.email.trim().is_empty() {
        return Err(AppError::BadRequest("Email is required".to_owned()));
    }
    Ok(Json(json!({
        "message": "If an account exists for this email, you will receive password reset instructions."
    })))
}

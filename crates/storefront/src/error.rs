//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Every error renders as
//! `{"error": "..."}` with a matching status code; server errors are captured
//! to Sentry first and their details never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::ai::AiSearchError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    AiSearch(#[from] AiSearchError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Duplicate or otherwise conflicting write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The payment provider declined the charge.
    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a `500` whose message is only logged.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::UserNotFound
                | AuthError::InvalidSessionState => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::OAuthDisabled => StatusCode::NOT_FOUND,
                AuthError::OAuthProvider(_) | AuthError::Http(_) => StatusCode::BAD_GATEWAY,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Checkout(err) => match err {
                CheckoutError::MissingField(_) | CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::WrongStep { .. } => StatusCode::CONFLICT,
                CheckoutError::PaymentFailed(_) => StatusCode::PAYMENT_REQUIRED,
            },
            Self::AiSearch(err) => match err {
                AiSearchError::MissingInput | AiSearchError::InvalidImage => StatusCode::BAD_REQUEST,
                AiSearchError::Vision(_) | AiSearchError::Failed(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PaymentFailed(_) => StatusCode::PAYMENT_REQUIRED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_owned(),
            Self::Database(RepositoryError::Conflict(msg))
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg)
            | Self::PaymentFailed(msg) => msg.clone(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    "Invalid email or password".to_owned()
                }
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_owned()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_owned(),
                AuthError::InvalidSessionState => "Session expired, please try again".to_owned(),
                AuthError::OAuthDisabled => "Sign-in provider is not configured".to_owned(),
                AuthError::OAuthProvider(_) | AuthError::Http(_) => {
                    "Sign-in provider error".to_owned()
                }
                _ => "Authentication error".to_owned(),
            },
            Self::Checkout(CheckoutError::PaymentFailed(msg)) => msg.clone(),
            Self::Checkout(err) => err.to_string(),
            Self::AiSearch(err @ (AiSearchError::MissingInput | AiSearchError::InvalidImage)) => {
                err.to_string()
            }
            Self::AiSearch(AiSearchError::Vision(_)) => "AI search failed".to_owned(),
            Self::AiSearch(AiSearchError::Failed(_)) => "Failed to process AI search".to_owned(),
            Self::RateLimited => "Too many requests, please try again later".to_owned(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = match &self {
            Self::AiSearch(AiSearchError::Vision(details) | AiSearchError::Failed(details)) => {
                json!({ "error": self.public_message(), "details": details })
            }
            _ => json!({ "error": self.public_message() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Record a user action that will show up in later Sentry reports.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_owned(),
                serde_json::Value::String((*value).to_owned()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product not found".to_owned());
        assert_eq!(err.to_string(), "Not found: Product not found");
    }

    #[tokio::test]
    async fn test_client_errors_keep_message() {
        let (status, body) = render(AppError::NotFound("Order not found".to_owned())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Order not found" }));

        let (status, body) =
            render(AppError::Database(RepositoryError::Conflict("Item already in wishlist".to_owned())))
                .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Item already in wishlist");

        let (status, _) = render(AppError::PaymentFailed("Insufficient funds".to_owned())).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);

        let (status, _) = render(AppError::RateLimited).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_server_errors_are_sanitized() {
        let (status, body) = render(AppError::Internal("pool exhausted".to_owned())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_auth_error_mapping() {
        let (status, body) = render(AppError::Auth(AuthError::InvalidCredentials)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");

        let (status, body) = render(AppError::Auth(AuthError::WeakPassword(
            "Passwords do not match".to_owned(),
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Passwords do not match");

        let (status, _) = render(AppError::Auth(AuthError::UserAlreadyExists)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_ai_search_errors_carry_details() {
        let (status, body) = render(AppError::AiSearch(AiSearchError::Vision(
            "All AI vision models failed".to_owned(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "AI search failed", "details": "All AI vision models failed" })
        );

        let (status, body) = render(AppError::AiSearch(AiSearchError::MissingInput)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Image or query text is required" }));
    }
}

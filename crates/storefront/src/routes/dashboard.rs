//! Customer dashboard: greeting, order history and reviews.

use axum::{Json, extract::State};
use serde::Serialize;

use luxe_jewel_core::initials;

use crate::db::{OrderRepository, ReviewRepository};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Order, Review};
use crate::state::AppState;

/// Who the dashboard is greeting.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Greeting {
    pub display_name: String,
    pub initials: String,
    pub email: String,
}

impl Greeting {
    #[must_use]
    pub fn for_user(user: &CurrentUser) -> Self {
        let display_name = user.display_name().to_owned();
        Self {
            initials: initials(&display_name),
            email: user.email.to_string(),
            display_name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    #[serde(flatten)]
    pub greeting: Greeting,
    pub orders: Vec<Order>,
    pub reviews: Vec<Review>,
}

/// `GET /dashboard`. Orders and reviews are newest first.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<DashboardView>> {
    let pool = state.pool();
    let order_repo = OrderRepository::new(pool);
    let review_repo = ReviewRepository::new(pool);
    let (orders, reviews) = tokio::try_join!(
        order_repo.list_for_user(user.id),
        review_repo.list_for_user(user.id),
    )?;

    Ok(Json(DashboardView {
        greeting: Greeting::for_user(&user),
        orders,
        reviews,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use luxe_jewel_core::{Email, UserId, UserRole};

    use super::*;

    fn user(full_name: Option<&str>) -> CurrentUser {
        CurrentUser {
            id: UserId::new(5),
            email: Email::parse("grace.hopper@example.com").unwrap(),
            full_name: full_name.map(str::to_owned),
            role: UserRole::Customer,
        }
    }

    #[test]
    fn test_greeting_uses_full_name() {
        let greeting = Greeting::for_user(&user(Some("Grace Hopper")));
        assert_eq!(greeting.display_name, "Grace Hopper");
        assert_eq!(greeting.initials, "GH");
    }

    #[test]
    fn test_greeting_falls_back_to_email() {
        let greeting = Greeting::for_user(&user(None));
        assert_eq!(greeting.display_name, "grace.hopper");
        assert_eq!(greeting.initials, "GR");
        assert_eq!(greeting.email, "grace.hopper@example.com");
    }
}

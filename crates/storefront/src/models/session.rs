//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use luxe_jewel_core::{Email, UserId, UserRole};

/// Session-stored user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

impl CurrentUser {
    /// Name to greet the user with, falling back to the email's local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.email.local_part())
    }
}

/// Session keys.
pub mod keys {
    /// The logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Persisted cart (JSON array of cart lines).
    pub const CART: &str = "luxejewel-cart";

    /// Persisted wishlist ids.
    pub const WISHLIST: &str = "luxejewel-wishlist";

    /// Persisted wishlist product snapshots, keyed by id.
    pub const WISHLIST_PRODUCTS: &str = "luxejewel-wishlist_products";

    /// Checkout progress.
    pub const CHECKOUT: &str = "checkout";

    /// OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";

    /// OAuth nonce (`OpenID` Connect replay protection).
    pub const OAUTH_NONCE: &str = "oauth_nonce";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let mut user = CurrentUser {
            id: UserId::new(1),
            email: Email::parse("jane.doe@example.com").unwrap(),
            full_name: None,
            role: UserRole::Customer,
        };
        assert_eq!(user.display_name(), "jane.doe");

        user.full_name = Some("  ".to_owned());
        assert_eq!(user.display_name(), "jane.doe");

        user.full_name = Some("Jane Doe".to_owned());
        assert_eq!(user.display_name(), "Jane Doe");
    }
}

//! Product reviews.

use chrono::{DateTime, Utc};
use serde::Serialize;

use luxe_jewel_core::{ProductId, ReviewId, UserId};

/// A review, joined with the reviewer's name when known.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: Option<UserId>,
    pub rating: i32,
    pub comment: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub reviewer_name: Option<String>,
}

/// Ratings are whole stars from 1 to 5.
#[must_use]
pub const fn is_valid_rating(rating: i32) -> bool {
    matches!(rating, 1..=5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(is_valid_rating(1));
        assert!(is_valid_rating(5));
        assert!(!is_valid_rating(0));
        assert!(!is_valid_rating(6));
    }
}

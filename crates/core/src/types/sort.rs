//! Sort orders accepted by catalog listings and search.

use serde::{Deserialize, Serialize};

/// Unknown sort key.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sort option: {0}")]
pub struct UnknownSort(pub String);

/// Ordering of the `/products` listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    /// Featured pieces first.
    #[default]
    Featured,
    /// New arrivals first.
    Newest,
    PriceLow,
    PriceHigh,
    Rating,
}

impl ProductSort {
    /// Parse a query value, falling back to the default for unknown input.
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl std::str::FromStr for ProductSort {
    type Err = UnknownSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "newest" => Ok(Self::Newest),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            other => Err(UnknownSort(other.to_owned())),
        }
    }
}

/// Ordering of `/api/search` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SearchSort {
    /// Keep the database order.
    #[default]
    Relevance,
    PriceLow,
    PriceHigh,
    /// Most recently added (highest id) first.
    Newest,
    Rating,
}

impl SearchSort {
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl std::str::FromStr for SearchSort {
    type Err = UnknownSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevance" => Ok(Self::Relevance),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "newest" => Ok(Self::Newest),
            "rating" => Ok(Self::Rating),
            other => Err(UnknownSort(other.to_owned())),
        }
    }
}

//! Domain types for LuxeJewel.

pub mod email;
pub mod id;
pub mod money;
pub mod sort;
pub mod status;
pub mod text;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{discount_percentage, format_currency};
pub use sort::{ProductSort, SearchSort, UnknownSort};
pub use status::*;
pub use text::initials;

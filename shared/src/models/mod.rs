//! Request models for the Bakery Back Office

mod category;
mod ingredient;
mod recipe;
mod supplier;
mod user;

pub use category::*;
pub use ingredient::*;
pub use recipe::*;
pub use supplier::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// Deserializer for clearable update fields.
///
/// A missing field stays `None` (keep the stored value) through
/// `#[serde(default)]`, an explicit `null` becomes `Some(None)` (clear it)
/// and a value becomes `Some(Some(v))`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

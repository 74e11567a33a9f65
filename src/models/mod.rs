//! Domain model module declarations.

use serde::{Deserialize, Deserializer};

pub mod agent;
pub mod cost;
pub mod message;
pub mod progress;
pub mod question;
pub mod state;
pub mod todo;

/// Deserialize a field that may be missing or explicitly `null` as its
/// default value.
///
/// Paired with `#[serde(default)]`, this guarantees map-valued fields such
/// as `visitCounts` are never absent to a reader, regardless of whether the
/// document omitted them or wrote `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

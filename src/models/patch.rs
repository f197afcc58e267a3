//! Tri-state field for partial updates.

use serde::{Deserialize, Deserializer};

/// A field in an update payload.
///
/// `Absent` leaves the stored value alone, `Null` clears an optional column,
/// `Value` replaces it. Fields must carry `#[serde(default)]` so that a
/// missing key deserializes to `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Patch::Null)
    }

    /// Convert a supplied value, keeping `Absent` and `Null` as they are.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Patch<U>, E> {
        Ok(match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)?),
        })
    }

    /// Resolve against the current value of a nullable column.
    pub fn apply_optional(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Absent => current,
            Patch::Null => None,
            Patch::Value(v) => Some(v),
        }
    }

    /// Resolve against the current value of a required column.
    /// `Null` is rejected during validation and never reaches here.
    pub fn apply_required(self, current: T) -> T {
        match self {
            Patch::Value(v) => v,
            Patch::Absent | Patch::Null => current,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

//! Keep / clear / set tri-state for outbound payload fields.
//!
//! Remote APIs distinguish "field absent" (leave untouched) from
//! "field: null" (clear it). `Option<T>` cannot express both, so payload
//! structs use [`FieldUpdate`] together with
//! `#[serde(skip_serializing_if = "FieldUpdate::is_keep")]`.

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    /// Omit the field; the remote value is left as is.
    #[default]
    Keep,
    /// Send an explicit `null`.
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldUpdate::Keep)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldUpdate::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// `Some` sets, `None` clears.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}

impl<T: Serialize> Serialize for FieldUpdate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Only reachable when a struct forgets `skip_serializing_if`.
            FieldUpdate::Keep | FieldUpdate::Clear => serializer.serialize_none(),
            FieldUpdate::Set(value) => value.serialize(serializer),
        }
    }
}

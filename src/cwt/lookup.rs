//! # Claim lookup
//!
//! A CBOR decoder can hand back a claims map in one of two shapes: a map
//! keyed by CBOR integers (`{2: "...", 65533: {...}}`), or a map keyed by
//! text where integer labels have been spelled as decimal strings
//! (`{"2": "...", "65533": {...}}`). The latter is what an encoder produces
//! from a plain keyed structure.
//!
//! [`ClaimMap`] selects the matching adapter once per decoded map so callers
//! read claims with the same [`Key`]s regardless of shape.

use std::fmt::{self, Display};

use anyhow::anyhow;
use ciborium::Value;

use crate::error::{Err, Error, Result};

/// Key of a claim in a CWT claims map or one of its nested maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key<'a> {
    /// Integer label, e.g. `65533` for `status_list`.
    Label(i64),

    /// Text key, e.g. `bits`.
    Name(&'a str),
}

impl From<i64> for Key<'_> {
    fn from(label: i64) -> Self {
        Self::Label(label)
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => write!(f, "{label}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Read-only view over a decoded CBOR map.
#[derive(Clone, Copy, Debug)]
pub enum ClaimMap<'a> {
    /// Integer labels are CBOR integers.
    Labelled(&'a [(Value, Value)]),

    /// Integer labels are decimal text strings.
    Named(&'a [(Value, Value)]),
}

impl<'a> ClaimMap<'a> {
    /// Select the adapter matching the shape of a decoded map.
    ///
    /// # Errors
    ///
    /// Returns a decode error when `value` is not a CBOR map.
    pub fn from_value(value: &'a Value) -> Result<Self> {
        let Some(entries) = value.as_map() else {
            return Err(Err::Decode(anyhow!("expected a CBOR map, found {value:?}")).into());
        };

        if entries.iter().any(|(k, _)| k.is_integer()) {
            Ok(Self::Labelled(entries))
        } else {
            Ok(Self::Named(entries))
        }
    }

    /// Value stored under `key`, if any.
    pub fn get<'k>(&self, key: impl Into<Key<'k>>) -> Option<&'a Value> {
        let key = key.into();
        let (Self::Labelled(entries) | Self::Named(entries)) = *self;
        entries.iter().find(|(k, _)| self.matches(k, key)).map(|(_, v)| v)
    }

    fn matches(&self, k: &Value, key: Key<'_>) -> bool {
        match (self, k, key) {
            (_, Value::Text(t), Key::Name(name)) => t == name,
            (Self::Labelled(_), Value::Integer(i), Key::Label(label)) => {
                i128::from(*i) == i128::from(label)
            }
            (Self::Named(_), Value::Text(t), Key::Label(label)) => *t == label.to_string(),
            _ => false,
        }
    }

    /// Text value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the value is present but not text.
    pub fn text<'k>(&self, key: impl Into<Key<'k>>) -> Result<Option<&'a str>> {
        let key = key.into();
        self.get(key)
            .map_or(Ok(None), |v| v.as_text().map(Some).ok_or_else(|| mismatch(key, "text")))
    }

    /// Integer value stored under `key`, converted to `T`.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the value is present but not an integer
    /// that fits `T`.
    pub fn integer<'k, T: TryFrom<i128>>(&self, key: impl Into<Key<'k>>) -> Result<Option<T>> {
        let key = key.into();
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let Some(integer) = value.as_integer() else {
            return Err(mismatch(key, "integer"));
        };
        T::try_from(i128::from(integer)).map(Some).map_err(|_| mismatch(key, "integer in range"))
    }

    /// Byte string stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the value is present but not a byte string.
    pub fn bytes<'k>(&self, key: impl Into<Key<'k>>) -> Result<Option<&'a [u8]>> {
        let key = key.into();
        self.get(key).map_or(Ok(None), |v| {
            v.as_bytes().map(|b| Some(b.as_slice())).ok_or_else(|| mismatch(key, "byte string"))
        })
    }

    /// Nested map stored under `key`, with its own adapter selected.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the value is present but not a map.
    pub fn map<'k>(&self, key: impl Into<Key<'k>>) -> Result<Option<Self>> {
        self.get(key).map(Self::from_value).transpose()
    }
}

fn mismatch(key: Key<'_>, expected: &str) -> Error {
    Err::Decode(anyhow!("claim {key} has an unexpected type, expected {expected}")).into()
}

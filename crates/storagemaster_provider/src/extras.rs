use std::collections::HashMap;
use std::fmt;

use super::errors::{Error, Result};

/// The MIME type of the stored object.
pub const CONTENT_TYPE: &str = "content-type";
/// A canned ACL such as `public-read`.
pub const ACL: &str = "acl";
pub const CACHE_CONTROL: &str = "cache-control";
pub const CONTENT_ENCODING: &str = "content-encoding";
pub const CONTENT_DISPOSITION: &str = "content-disposition";

/// The value shapes an [`Extras`] entry can hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtraValue {
    String(String),
    Bool(bool),
    Integer(i64),
}

impl ExtraValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExtraValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ExtraValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ExtraValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for ExtraValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExtraValue::String(s) => write!(f, "{s}"),
            ExtraValue::Bool(b) => write!(f, "{b}"),
            ExtraValue::Integer(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for ExtraValue {
    fn from(s: &str) -> ExtraValue {
        ExtraValue::String(s.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(s: String) -> ExtraValue {
        ExtraValue::String(s)
    }
}

impl From<bool> for ExtraValue {
    fn from(b: bool) -> ExtraValue {
        ExtraValue::Bool(b)
    }
}

impl From<i64> for ExtraValue {
    fn from(i: i64) -> ExtraValue {
        ExtraValue::Integer(i)
    }
}

/// Optional per-call metadata handed to [`super::Provider::put`].
///
/// Each backend documents the keys it recognizes (see [`super::S3Provider`]); everything else is
/// carried along and ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extras {
    extras: HashMap<String, ExtraValue>,
}

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites any value previously set for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ExtraValue>) {
        self.extras.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Result<&ExtraValue> {
        self.extras
            .get(key)
            .ok_or_else(|| Error::ExtraNotFound(key.to_string()))
    }

    /// Looks up a string-valued entry. Absence is `Ok(None)`; a value of another shape is an
    /// [`Error::InvalidExtra`].
    pub fn get_str(&self, key: &str) -> Result<Option<&str>> {
        match self.extras.get(key) {
            None => Ok(None),
            Some(v) => v.as_str().map(Some).ok_or_else(|| Error::InvalidExtra {
                key: key.to_string(),
                expected: "string",
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.extras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extras.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtraValue)> {
        self.extras.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Extras
where
    K: Into<String>,
    V: Into<ExtraValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut extras = Extras::new();
        for (k, v) in iter {
            extras.set(k, v);
        }
        extras
    }
}

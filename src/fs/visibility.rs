use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Option key carrying the visibility of a written object.
pub const VISIBILITY: &str = "visibility";

/// Whether a written object is publicly or privately readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named options handed to write-type operations.
///
/// Only `visibility` is interpreted by the facade; every other option is passed
/// through to the adapter untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationConfig {
    options: BTreeMap<String, String>,
}

impl OperationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`OperationConfig::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn visibility(&self) -> Option<Visibility> {
        match self.get(VISIBILITY)? {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }

    /// Return a copy with `visibility` set, overriding any caller-supplied value.
    pub fn with_visibility(&self, visibility: Visibility) -> Self {
        self.clone().with(VISIBILITY, visibility.as_str())
    }
}

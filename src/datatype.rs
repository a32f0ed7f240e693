//! Value normalization applied to imported text properties.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Text with markup removed and whitespace collapsed.
///
/// Tags are stripped, runs of whitespace (including newlines) become a
/// single space, and the result is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SanitizedString(String);

impl SanitizedString {
    pub fn new(raw: &str) -> Self {
        let without_tags = TAG.replace_all(raw, " ");
        let collapsed = WHITESPACE.replace_all(without_tags.trim(), " ");
        Self(collapsed.into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SanitizedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SanitizedString {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Serialize for SanitizedString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

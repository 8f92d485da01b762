//! Generic integer attribute access for scene filters.

use std::fmt;
use std::str::FromStr;

use zinc_core::ZincError;

use crate::filter::Scenefilter;

/// Attributes readable and writable through the integer attribute API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenefilterAttribute {
    /// Non-zero if the match result is negated.
    IsInverse,
}

impl ScenefilterAttribute {
    /// All attributes, in declaration order.
    pub const ALL: [Self; 1] = [Self::IsInverse];

    /// Returns the canonical string for this attribute.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IsInverse => "IS_INVERSE",
        }
    }
}

impl fmt::Display for ScenefilterAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenefilterAttribute {
    type Err = ZincError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attribute| attribute.as_str() == s)
            .ok_or_else(|| ZincError::UnknownEnumValue {
                kind: "scene filter attribute",
                value: s.to_string(),
            })
    }
}

impl Scenefilter {
    /// Returns an attribute as an integer; booleans read as 0 or 1.
    #[must_use]
    pub fn attribute_integer(&self, attribute: ScenefilterAttribute) -> i32 {
        match attribute {
            ScenefilterAttribute::IsInverse => i32::from(self.is_inverse()),
        }
    }

    /// Sets an attribute from an integer; any non-zero value means true.
    pub fn set_attribute_integer(&self, attribute: ScenefilterAttribute, value: i32) {
        match attribute {
            ScenefilterAttribute::IsInverse => self.set_inverse(value != 0),
        }
    }
}

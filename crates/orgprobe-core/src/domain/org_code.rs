use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Accepted organization code lengths (legal-entity and individual codes).
pub const VALID_CODE_LENGTHS: [usize; 2] = [8, 10];

/// Validated organization code.
///
/// Only the length is checked here; site-specific charset rules belong to the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrganizationCode(String);

impl OrganizationCode {
    /// Parse a code exactly as submitted; whitespace counts toward the length.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let len = input.chars().count();
        if !VALID_CODE_LENGTHS.contains(&len) {
            return Err(ValidationError::InvalidIdentifierLength { len });
        }

        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrganizationCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for OrganizationCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for OrganizationCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for OrganizationCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<OrganizationCode> for String {
    fn from(value: OrganizationCode) -> Self {
        value.0
    }
}

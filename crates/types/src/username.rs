//! Validated username type.

/// Errors that can occur when creating a validated username.
#[derive(Debug, thiserror::Error)]
pub enum UsernameError {
    #[error("username cannot be empty")]
    Empty,
    #[error("username exceeds maximum length of {0} characters")]
    TooLong(usize),
    #[error("username contains invalid characters (only alphanumeric, '.', '-', '_' allowed)")]
    InvalidCharacters,
}

const MAX_USERNAME_LEN: usize = 64;

/// A login name that is guaranteed non-empty, bounded in length, and
/// restricted to a conservative ASCII set.
///
/// Input is trimmed and lowercased during construction so lookups are
/// case-insensitive without storing duplicate spellings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn new(input: impl AsRef<str>) -> Result<Self, UsernameError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }
        if trimmed.len() > MAX_USERNAME_LEN {
            return Err(UsernameError::TooLong(MAX_USERNAME_LEN));
        }

        let ok = trimmed
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));
        if !ok {
            return Err(UsernameError::InvalidCharacters);
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> serde::Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Username::new(&s).map_err(serde::de::Error::custom)
    }
}

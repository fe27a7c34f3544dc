//! Brazilian postal code (CEP) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    /// The input contains no digits at all.
    #[error("postal code cannot be empty")]
    Empty,
    /// The input does not have exactly eight digits.
    #[error("postal code must have {expected} digits (got {len})")]
    WrongLength {
        /// Number of digits required.
        expected: usize,
        /// Number of digits found.
        len: usize,
    },
}

/// A Brazilian postal code (CEP).
///
/// Input is accepted with or without punctuation (`01310-100`, `01310100`,
/// `01.310-100`); everything but digits is stripped and exactly eight digits
/// must remain. The canonical form holds digits only.
///
/// ## Examples
///
/// ```
/// use shopfront_core::PostalCode;
///
/// let cep = PostalCode::parse("01310-100").unwrap();
/// assert_eq!(cep.as_str(), "01310100");
/// assert_eq!(cep.formatted(), "01310-100");
///
/// assert!(PostalCode::parse("").is_err());
/// assert!(PostalCode::parse("1234").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Number of digits in a CEP.
    pub const DIGITS: usize = 8;

    /// Parse a `PostalCode` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input holds no digits or a digit count other
    /// than eight.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();

        if digits.is_empty() {
            return Err(PostalCodeError::Empty);
        }

        if digits.len() != Self::DIGITS {
            return Err(PostalCodeError::WrongLength {
                expected: Self::DIGITS,
                len: digits.len(),
            });
        }

        Ok(Self(digits))
    }

    /// Returns the eight digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the conventional `12345-678` rendering.
    #[must_use]
    pub fn formatted(&self) -> String {
        let (head, tail) = self.0.split_at(5);
        format!("{head}-{tail}")
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl std::str::FromStr for PostalCode {
    type Err = PostalCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = PostalCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(cep: PostalCode) -> Self {
        cep.0
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

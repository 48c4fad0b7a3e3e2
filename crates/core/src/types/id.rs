//! Identifier types.
//!
//! [`OrderId`] is the customer-facing order code (`YARN-XXXXXXXX`). It is
//! printed on confirmation emails and typed back in by customers on the
//! tracking page, so the text format is a contract shared with other
//! systems and must not change.
//!
//! [`CartItemId`] identifies a line within a single cart.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderIdError {
    /// The input does not start with `YARN-`.
    #[error("order id must start with {prefix:?}")]
    MissingPrefix {
        /// Required prefix.
        prefix: &'static str,
    },
    /// The code after the prefix has the wrong length.
    #[error("order id code must be exactly {expected} characters (got {actual})")]
    WrongLength {
        /// Required code length.
        expected: usize,
        /// Length of the supplied code.
        actual: usize,
    },
    /// The code contains a character outside `[A-Z0-9]`.
    #[error("order id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A customer-facing order identifier: `YARN-` followed by 8 characters
/// from `[A-Z0-9]`.
///
/// The format alone does not guarantee uniqueness. Uniqueness is checked
/// against the order store when the id is generated.
///
/// ## Examples
///
/// ```
/// use yarn_core::OrderId;
///
/// assert!(OrderId::is_valid("YARN-9K2M4P1X"));
/// assert!(!OrderId::is_valid("YARN-9K2M4P1"));  // 7 chars
/// assert!(!OrderId::is_valid("yarn-9K2M4P1X")); // lowercase prefix
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId(String);

impl OrderId {
    /// Literal prefix of every order id.
    pub const PREFIX: &'static str = "YARN-";

    /// Number of characters after the prefix.
    pub const CODE_LENGTH: usize = 8;

    /// Characters a code may be drawn from.
    pub const ALPHABET: &'static [u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Parse an `OrderId` from a string.
    ///
    /// The input is matched literally: no trimming, no case folding.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is missing, the code is not exactly
    /// 8 characters, or the code contains a character outside `[A-Z0-9]`.
    pub fn parse(s: &str) -> Result<Self, OrderIdError> {
        let code = s.strip_prefix(Self::PREFIX).ok_or(OrderIdError::MissingPrefix {
            prefix: Self::PREFIX,
        })?;

        let actual = code.chars().count();
        if actual != Self::CODE_LENGTH {
            return Err(OrderIdError::WrongLength {
                expected: Self::CODE_LENGTH,
                actual,
            });
        }

        if let Some(bad) = code.chars().find(|c| !Self::is_code_char(*c)) {
            return Err(OrderIdError::InvalidCharacter(bad));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns `true` if `s` is a well-formed order id.
    ///
    /// Use this to reject user-supplied ids (e.g. from the tracking form)
    /// before they reach a backend query.
    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// Build an order id from an 8-character code.
    ///
    /// # Errors
    ///
    /// Returns an error if `code` is not 8 characters from `[A-Z0-9]`.
    pub fn from_code(code: &str) -> Result<Self, OrderIdError> {
        Self::parse(&format!("{}{code}", Self::PREFIX))
    }

    /// Draw a candidate id: 8 characters chosen independently and
    /// uniformly from [`OrderId::ALPHABET`].
    ///
    /// The result is format-valid but not checked for uniqueness.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut id = String::with_capacity(Self::PREFIX.len() + Self::CODE_LENGTH);
        id.push_str(Self::PREFIX);
        for _ in 0..Self::CODE_LENGTH {
            #[allow(clippy::indexing_slicing)] // index drawn from 0..ALPHABET.len()
            id.push(char::from(Self::ALPHABET[rng.random_range(0..Self::ALPHABET.len())]));
        }
        Self(id)
    }

    /// Derive an id from a millisecond timestamp and an entropy word.
    ///
    /// Deterministic for the same inputs and always format-valid. Used only
    /// when random candidates keep colliding; the result is not checked
    /// against the order store.
    #[must_use]
    pub fn from_entropy(timestamp_millis: u64, entropy: u64) -> Self {
        let radix = Self::ALPHABET.len() as u64;
        let mut mixed = timestamp_millis.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ entropy;

        let mut id = String::with_capacity(Self::PREFIX.len() + Self::CODE_LENGTH);
        id.push_str(Self::PREFIX);
        for _ in 0..Self::CODE_LENGTH {
            #[allow(clippy::indexing_slicing, clippy::cast_possible_truncation)] // < 36
            id.push(char::from(Self::ALPHABET[(mixed % radix) as usize]));
            mixed /= radix;
        }
        Self(id)
    }

    /// Returns the order id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the 8-character code after the prefix.
    #[must_use]
    pub fn code(&self) -> &str {
        self.0.get(Self::PREFIX.len()..).unwrap_or_default()
    }

    /// Consumes the `OrderId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    const fn is_code_char(c: char) -> bool {
        c.is_ascii_uppercase() || c.is_ascii_digit()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for OrderId {
    type Err = OrderIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OrderId {
    type Error = OrderIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a line item within one cart.
///
/// Assigned by the caller when the item is added. The cart does not
/// de-duplicate, so two lines for the same product need distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemId(String);

impl CartItemId {
    /// Create a new cart item id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CartItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CartItemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

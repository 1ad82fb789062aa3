//! The email address users log in with.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// An email address of the form `local@domain`.
///
/// Email addresses are compared exactly as they were entered, so
/// `Alice@example.com` and `alice@example.com` are two different users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Create an email address, rejecting strings that are obviously not addresses.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmail] if `email` does not contain exactly one `@`
    /// with text on both sides, or if it contains whitespace.
    pub fn new(email: &str) -> Result<Self, Error> {
        let is_valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !email.chars().any(char::is_whitespace)
            }
            None => false,
        };

        if is_valid {
            Ok(Self(email.to_owned()))
        } else {
            Err(Error::InvalidEmail(email.to_owned()))
        }
    }

    /// Create an email address without validation.
    ///
    /// The caller should ensure that `email` came from a validated [Email],
    /// e.g. a value read back from the database.
    pub fn new_unchecked(email: &str) -> Self {
        Self(email.to_owned())
    }
}

impl TryFrom<String> for Email {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::new(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

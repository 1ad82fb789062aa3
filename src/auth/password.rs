//! This file defines types that handle password hashing.
//! `RawPassword` wraps the plaintext a user typed in.
//! `PasswordHash` converts a `RawPassword` into a salted and hashed password.

use std::fmt::Display;

use bcrypt::{BcryptError, non_truncating_hash, non_truncating_verify};
use serde::Deserialize;

use crate::Error;

/// The longest password, in bytes, that bcrypt hashes without truncating it.
pub const MAX_PASSWORD_BYTES: usize = 71;

/// A plaintext password that has not been hashed yet.
///
/// The password must not be empty and must fit in [MAX_PASSWORD_BYTES].
#[derive(Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct RawPassword(String);

impl RawPassword {
    /// Create a new password from a string.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyPassword] if `raw_password` is empty, or
    /// [Error::PasswordTooLong] if it is longer than [MAX_PASSWORD_BYTES].
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        if raw_password.is_empty() {
            return Err(Error::EmptyPassword);
        }

        if raw_password.len() > MAX_PASSWORD_BYTES {
            return Err(Error::PasswordTooLong);
        }

        Ok(Self(raw_password.to_owned()))
    }
}

impl TryFrom<String> for RawPassword {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl std::fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RawPassword").field(&"********").finish()
    }
}

impl Display for RawPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with a fresh random salt and the specified `cost`.
    ///
    /// Hashing the same password twice gives two different hashes, both of which verify.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a password.
    /// A value of at least 12 is recommended. Pass in [PasswordHash::DEFAULT_COST] to use the recommended cost.
    ///
    /// # Errors
    ///
    /// This function will return an error if the password could not be hashed.
    pub fn new(password: &RawPassword, cost: u32) -> Result<Self, Error> {
        match non_truncating_hash(&password.0, cost) {
            Ok(password_hash) => Ok(Self(password_hash)),
            Err(BcryptError::Truncation(_)) => Err(Error::PasswordTooLong),
            Err(e) => Err(Error::HashingError(e.to_string())),
        }
    }

    /// Create a new `PasswordHash` without any validation.
    ///
    /// The caller should ensure that `raw_password_hash` is a valid password hash.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if an invalid hash is provided it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Try to create a password hash from a raw password string.
    ///
    /// This is a convenience function that removes the need to manually create
    /// the intermediate `RawPassword` type.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        let raw_password = RawPassword::new(raw_password)?;
        PasswordHash::new(&raw_password, cost)
    }

    /// Check that `raw_password` matches the stored password.
    ///
    /// bcrypt compares the recomputed hash in constant time, so the time taken
    /// does not depend on where the first mismatching byte is. Every byte of
    /// `raw_password` counts, a password longer than [MAX_PASSWORD_BYTES]
    /// never matches.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the stored hash is not a valid bcrypt hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        match non_truncating_verify(raw_password, &self.0) {
            Ok(is_match) => Ok(is_match),
            Err(BcryptError::Truncation(_)) => Ok(false),
            Err(error) => Err(Error::HashingError(error.to_string())),
        }
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}


#[cfg(test)]
mod password_hash_tests {
    use crate::{
        Error,
        auth::{PasswordHash, RawPassword, password::MAX_PASSWORD_BYTES},
    };

    #[test]
    fn verify_password_succeeds_for_valid_password() {
        let hash = PasswordHash::new_unchecked(
            "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
        );
        let password = "okon";

        assert!(hash.verify(password).unwrap());
    }

    #[test]
    fn verify_password_fails_for_invalid_password() {
        let hash = PasswordHash::new_unchecked(
            "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
        );
        let password = "thewrongpassword";

        assert!(!hash.verify(password).unwrap());
    }

    #[test]
    fn hash_password_produces_verifiable_hash() {
        let password = "roostersgocockledoodledoo";
        let wrong_password = "the_wrong_password";
        let hash = PasswordHash::from_raw_password(password, 4).unwrap();

        assert!(hash.verify(password).unwrap());
        assert!(!hash.verify(wrong_password).unwrap());
    }

    #[test]
    fn hash_duplicate_password_produces_unique_hash() {
        let password = RawPassword::new("turkeysgogobblegobble").unwrap();
        let hash = PasswordHash::new(&password, 4).unwrap();
        let dupe_hash = PasswordHash::new(&password, 4).unwrap();

        assert_ne!(hash, dupe_hash);
        assert!(hash.verify("turkeysgogobblegobble").unwrap());
        assert!(dupe_hash.verify("turkeysgogobblegobble").unwrap());
    }

    #[test]
    fn verify_fails_on_garbage_hash() {
        let hash = PasswordHash::new_unchecked("not a bcrypt hash");

        assert!(matches!(hash.verify("okon"), Err(Error::HashingError(_))));
    }

    #[test]
    fn from_raw_password_fails_on_empty_password() {
        let hash = PasswordHash::from_raw_password("", 4);

        assert_eq!(hash, Err(Error::EmptyPassword));
    }

    #[test]
    fn passwords_sharing_a_long_prefix_do_not_verify_each_other() {
        let prefix = "a".repeat(MAX_PASSWORD_BYTES - 7);
        let password = format!("{prefix}correct");
        let other = format!("{prefix}WRONG-1");
        let hash = PasswordHash::from_raw_password(&password, 4).unwrap();

        assert!(hash.verify(&password).unwrap());
        assert!(!hash.verify(&other).unwrap());
    }

    #[test]
    fn verify_rejects_password_longer_than_limit() {
        let password = "a".repeat(MAX_PASSWORD_BYTES);
        let hash = PasswordHash::from_raw_password(&password, 4).unwrap();

        let longer = format!("{password}-and-then-some");

        assert_eq!(hash.verify(&longer), Ok(false));
    }

    #[test]
    fn from_raw_password_fails_on_long_password() {
        let hash = PasswordHash::from_raw_password(&"a".repeat(80), 4);

        assert_eq!(hash, Err(Error::PasswordTooLong));
    }
}

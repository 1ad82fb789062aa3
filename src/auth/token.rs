//! Issues and validates the signed bearer tokens handed out at log-in.

use std::sync::Arc;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, clock::Clock};

/// The contents of a bearer token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject, the email of the user the token was issued to.
    pub sub: String,
    /// The time the token was issued, in seconds since the Unix epoch.
    pub iat: i64,
    /// The time the token expires, in seconds since the Unix epoch.
    pub exp: i64,
}

/// The body returned by a successful log-in.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    /// The signed token to send in the `Authorization: Bearer` header.
    pub access_token: String,
    /// Always "bearer".
    pub token_type: String,
}

impl TokenResponse {
    /// Wrap `access_token` in an OAuth2 bearer token response.
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_owned(),
        }
    }
}

/// Signs and verifies HS256 tokens with a key derived from the server secret.
///
/// Tokens are stateless: there is no revocation list, a token is valid until
/// it expires.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service that signs with a key derived from `secret`.
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        let key = Sha512::digest(secret);

        // Expiry is checked against `clock` in `validate`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(&key),
            decoding_key: DecodingKey::from_secret(&key),
            validation,
            clock,
        }
    }

    /// Issue a token for `subject` that expires `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns [Error::TokenCreation] if the token could not be signed.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, Error> {
        let now = self.clock.now();
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|error| Error::TokenCreation(error.to_string()))
    }

    /// Check the signature and expiry of `token` and return its subject.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::InvalidTokenSignature] if the signature does not match the contents,
    /// - [Error::MalformedToken] if the token cannot be parsed,
    /// - or [Error::TokenExpired] if the current time is at or after the expiry time.
    pub fn validate(&self, token: &str) -> Result<String, Error> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |error| match error.kind() {
                ErrorKind::InvalidSignature => Error::InvalidTokenSignature,
                _ => Error::MalformedToken,
            },
        )?;

        if self.clock.now().unix_timestamp() >= token_data.claims.exp {
            return Err(Error::TokenExpired);
        }

        Ok(token_data.claims.sub)
    }
}

//! Password validation and hashing.
//!
//! A raw password goes through two stages: [ValidatedPassword] proves it
//! passed the strength check, and [PasswordHash] is the salted bcrypt hash
//! that actually gets stored.

use std::fmt::Display;

use bcrypt::BcryptError;
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that passed the strength check but has not been hashed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Validate a raw password string.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] when the password scores below the accepted
    /// strength, with feedback on how to improve it.
    pub fn new(raw_password_string: &str) -> Result<Self, Error> {
        let analysis = zxcvbn(raw_password_string, &[]);

        if matches!(analysis.score(), Score::Three | Score::Four) {
            Ok(Self(raw_password_string.to_owned()))
        } else {
            let feedback = analysis
                .feedback()
                .unwrap_or(&Feedback::default())
                .to_string();

            Err(Error::TooWeak(feedback))
        }
    }

    /// Wrap a string without checking its strength.
    ///
    /// Intended for tests and for callers that already validated the value.
    pub fn new_unchecked(raw_password_string: &str) -> Self {
        Self(raw_password_string.to_owned())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the underlying password.
        f.write_str("********")
    }
}

/// A salted and hashed password, as stored in the users table.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The recommended bcrypt cost. Tests use a lower cost to stay fast.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a validated password with the given bcrypt `cost`.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the hashing library fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        bcrypt::hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap an existing hash read back from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Validate and hash a raw password in one step.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] or [Error::HashingError] as the two stages do.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        Self::new(ValidatedPassword::new(raw_password)?, cost)
    }

    /// Check whether `raw_password` matches this hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        bcrypt::verify(raw_password, &self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}


#[cfg(test)]
mod password_hash_tests {
    use crate::auth::{PasswordHash, ValidatedPassword};

    #[test]
    fn verify_accepts_the_original_password() {
        let password = "roostersgocockledoodledoo";
        let hash = PasswordHash::from_raw_password(password, 4).unwrap();

        assert!(hash.verify(password).unwrap());
        assert!(!hash.verify("thewrongpassword").unwrap());
    }

    #[test]
    fn hashing_the_same_password_twice_gives_different_hashes() {
        let password = ValidatedPassword::new("turkeysgogobblegobble").unwrap();

        let first = PasswordHash::new(password.clone(), 4).unwrap();
        let second = PasswordHash::new(password, 4).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn from_raw_password_applies_the_strength_check() {
        assert!(PasswordHash::from_raw_password("password1234", 4).is_err());
    }
}

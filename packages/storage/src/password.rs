// ABOUTME: Password storage schemes for registered users
// ABOUTME: Plaintext (default, stored as given) or opt-in Argon2id PHC strings

use std::fmt;
use std::str::FromStr;

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use subtle::ConstantTimeEq;

use crate::error::StorageError;

/// How new passwords are written to the `users.password` column.
///
/// `Plaintext` keeps the stored value byte-for-byte equal to what the caller
/// supplied. `Argon2` stores a salted Argon2id hash in PHC string format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordScheme {
    #[default]
    Plaintext,
    Argon2,
}

impl PasswordScheme {
    /// Produce the value to persist for `password`.
    pub fn hash(&self, password: &str) -> Result<String, StorageError> {
        match self {
            PasswordScheme::Plaintext => Ok(password.to_string()),
            PasswordScheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| StorageError::PasswordHash(e.to_string()))
            }
        }
    }

    /// Check `password` against a stored value.
    ///
    /// The stored value decides how it is checked, not the configured scheme:
    /// PHC strings are verified with Argon2, anything else is compared as plaintext.
    pub fn verify(password: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => constant_time_eq(password, stored),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordScheme::Plaintext => "plaintext",
            PasswordScheme::Argon2 => "argon2",
        }
    }
}

impl FromStr for PasswordScheme {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plaintext" | "plain" => Ok(PasswordScheme::Plaintext),
            "argon2" | "argon2id" => Ok(PasswordScheme::Argon2),
            other => Err(StorageError::InvalidInput(format!(
                "Unknown password scheme: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for PasswordScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Length mismatch short-circuits; only the content comparison is constant-time.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).unwrap_u8() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_is_stored_as_given() {
        let stored = PasswordScheme::Plaintext.hash("password123").unwrap();
        assert_eq!(stored, "password123");
        assert!(PasswordScheme::verify("password123", &stored));
        assert!(!PasswordScheme::verify("password124", &stored));
        assert!(!PasswordScheme::verify("password12", &stored));
    }

    #[test]
    fn test_whitespace_password_is_kept_verbatim() {
        let stored = PasswordScheme::Plaintext.hash("   ").unwrap();
        assert_eq!(stored, "   ");
        assert!(PasswordScheme::verify("   ", &stored));
        assert!(!PasswordScheme::verify("", &stored));
    }

    #[test]
    fn test_argon2_hash_is_salted_phc_string() {
        let first = PasswordScheme::Argon2.hash("securepass").unwrap();
        let second = PasswordScheme::Argon2.hash("securepass").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, "securepass");
        assert_ne!(first, second, "Each hash should use a fresh salt");

        assert!(PasswordScheme::verify("securepass", &first));
        assert!(PasswordScheme::verify("securepass", &second));
        assert!(!PasswordScheme::verify("wrongpass", &first));
    }

    #[test]
    fn test_hashed_value_is_not_accepted_as_password() {
        let stored = PasswordScheme::Argon2.hash("securepass").unwrap();
        assert!(!PasswordScheme::verify(&stored, &stored));
    }

    #[test]
    fn test_non_phc_rows_compare_as_plaintext() {
        assert!(PasswordScheme::verify("legacy", "legacy"));
        assert!(!PasswordScheme::verify("legacy", "other"));
    }

    #[test]
    fn test_parse_scheme() {
        assert_eq!(
            "plaintext".parse::<PasswordScheme>().unwrap(),
            PasswordScheme::Plaintext
        );
        assert_eq!(
            " Argon2 ".parse::<PasswordScheme>().unwrap(),
            PasswordScheme::Argon2
        );
        assert!("bcrypt".parse::<PasswordScheme>().is_err());
    }
}

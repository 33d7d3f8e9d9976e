//! Argon2 password digests for user accounts.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Failure while producing a digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordError {
    message: String,
}

/// PHC-format Argon2 digest as stored in `users.password_hash`.
///
/// # Examples
/// ```
/// use schoolapp::domain::PasswordDigest;
///
/// let digest = PasswordDigest::hash("correct horse").unwrap();
/// assert!(digest.verify("correct horse"));
/// assert!(!digest.verify("battery staple"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hash `plain` with a fresh random salt.
    ///
    /// # Errors
    /// Returns [`PasswordError`] when Argon2 rejects the input.
    pub fn hash(plain: &str) -> Result<Self, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(|err| PasswordError {
                message: err.to_string(),
            })
    }

    /// Wrap a digest loaded from storage.
    #[must_use]
    pub const fn from_stored(phc: String) -> Self {
        Self(phc)
    }

    /// `true` when `plain` matches. Malformed stored digests never match.
    #[must_use]
    pub fn verify(&self, plain: &str) -> bool {
        PasswordHash::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// PHC string for persistence.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn salts_differ_between_hashes() {
        let first = PasswordDigest::hash("pw").expect("hash");
        let second = PasswordDigest::hash("pw").expect("hash");
        assert_ne!(first.as_str(), second.as_str());
        assert!(first.verify("pw") && second.verify("pw"));
    }

    #[test]
    fn malformed_digest_never_verifies() {
        let digest = PasswordDigest::from_stored("plaintext".to_owned());
        assert!(!digest.verify("plaintext"));
    }

    #[test]
    fn debug_output_hides_digest() {
        let digest = PasswordDigest::hash("pw").expect("hash");
        assert_eq!(format!("{digest:?}"), "PasswordDigest(..)");
    }
}

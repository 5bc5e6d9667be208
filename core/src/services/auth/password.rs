//! Password hash verification

use once_cell::sync::Lazy;

/// Checks a plaintext password against a stored hash
pub trait PasswordVerifier: Send + Sync {
    /// A malformed hash counts as a mismatch
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// bcrypt verification, as used for the stored user hashes
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

impl PasswordVerifier for BcryptVerifier {
    fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

/// Hash checked when the email is unknown, so a miss costs the same bcrypt
/// work as a wrong password. Built once at the default cost.
pub(crate) static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    bcrypt::hash("turnstile-unknown-account", bcrypt::DEFAULT_COST).unwrap_or_default()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcrypt_verifier() {
        let hash = bcrypt::hash("s3cret!", 4).unwrap();

        assert!(BcryptVerifier.verify("s3cret!", &hash));
        assert!(!BcryptVerifier.verify("wrong", &hash));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!BcryptVerifier.verify("anything", "not-a-hash"));
    }

    #[test]
    fn test_dummy_hash_is_well_formed() {
        assert!(DUMMY_HASH.starts_with("$2"));
        assert!(!BcryptVerifier.verify("s3cret!", &DUMMY_HASH));
    }
}

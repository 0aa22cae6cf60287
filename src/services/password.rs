use bcrypt::{hash, verify};

/// One-way, salted password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, String>;

    /// `false` on mismatch and on a stored hash that cannot be parsed.
    fn verify(&self, plain: &str, hashed: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plain: &str) -> Result<String, String> {
        hash(plain, self.cost).map_err(|e| format!("Failed to hash password: {}", e))
    }

    fn verify(&self, plain: &str, hashed: &str) -> bool {
        match verify(plain, hashed) {
            Ok(valid) => valid,
            Err(e) => {
                log::warn!("⚠️ Stored password hash could not be verified: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt minimum cost keeps the tests fast
    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_then_verify() {
        let hasher = BcryptHasher::new(TEST_COST);
        let hashed = hasher.hash("correct horse").unwrap();

        assert_ne!(hashed, "correct horse");
        assert!(hasher.verify("correct horse", &hashed));
        assert!(!hasher.verify("battery staple", &hashed));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = BcryptHasher::new(TEST_COST);
        let first = hasher.hash("same").unwrap();
        let second = hasher.hash("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        let hasher = BcryptHasher::new(TEST_COST);
        assert!(!hasher.verify("anything", "not-a-bcrypt-hash"));
    }
}

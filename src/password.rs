use anyhow::Context;

/// Prefixes of bcrypt modular-crypt strings. A stored value starting with one
/// of these was produced by this system's hasher and must never be re-hashed.
const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

pub trait PasswordHasherTrait: Send + Sync {
    fn hash_password(&self, plaintext: &str) -> anyhow::Result<String>;
    fn verify_password(&self, plaintext: &str, hash: &str) -> anyhow::Result<bool>;

    /// Recognizes values already produced by `hash_password`.
    fn is_hashed(&self, value: &str) -> bool {
        BCRYPT_PREFIXES.iter().any(|p| value.starts_with(p))
    }
}

#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Lower costs keep test suites fast; bcrypt rejects anything below 4.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherTrait for BcryptPasswordHasher {
    fn hash_password(&self, plaintext: &str) -> anyhow::Result<String> {
        bcrypt::hash(plaintext, self.cost).context("bcrypt hashing failed")
    }

    fn verify_password(&self, plaintext: &str, hash: &str) -> anyhow::Result<bool> {
        bcrypt::verify(plaintext, hash).context("bcrypt verification failed")
    }
}

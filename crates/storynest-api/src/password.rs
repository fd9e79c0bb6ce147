use anyhow::{Result, anyhow};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use once_cell::sync::OnceCell;

/// Argon2id password hashing. Holds no secrets, only cost parameters.
#[derive(Clone, Default)]
pub struct CredentialStore {
    argon2: Argon2<'static>,
    decoy: OnceCell<String>,
}

impl CredentialStore {
    /// `memory_kib` must be at least `8 * parallelism`.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| anyhow!("Invalid Argon2 parameters: {}", e))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy: OnceCell::new(),
        })
    }

    /// Salted PHC-format hash; two calls with the same input never agree.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Password hashing failed: {}", e))?;
        Ok(hash.to_string())
    }

    /// False for a wrong password and for a stored hash that does not parse.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Spends the same effort as a real `verify` for logins naming an
    /// unknown user. Always false.
    pub fn verify_decoy(&self, password: &str) -> bool {
        let decoy = self
            .decoy
            .get_or_try_init(|| self.hash("storynest-decoy-password"));
        if let Ok(hash) = decoy {
            let _ = self.verify(password, hash);
        }
        false
    }
}

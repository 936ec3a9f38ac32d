use sha2::{Digest, Sha256};
use shared::Role;

/// An account. The password is only ever held as a salted digest.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role_id: String,
    pub role: Role,
    pub password_hash: String,
    pub password_salt: String,
    pub created_at: String,
}

impl User {
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Build a new account with a freshly salted password digest
    pub fn new(name: &str, email: &str, role_id: &str, role: Role, password: &str, created_at: String) -> Self {
        let password_salt = uuid::Uuid::new_v4().simple().to_string();
        let password_hash = hash_password(&password_salt, password);
        Self {
            id: Self::generate_id(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            role_id: role_id.trim().to_string(),
            role,
            password_hash,
            password_salt,
            created_at,
        }
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        let digest = hash_password(&self.password_salt, candidate);
        constant_time_eq(digest.as_bytes(), self.password_hash.as_bytes())
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

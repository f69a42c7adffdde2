use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    /// One-way hash produced by the hashing collaborator. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// Creation candidate. Roles are attached by the caller from catalog lookups
/// before the directory service persists them alongside the new user.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<Role>,
}

/// Update input: name, surname and email replace the stored values
/// unconditionally; a missing or empty password keeps the stored hash.
#[derive(Clone, Deserialize)]
pub struct UserPatch {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: Option<String>,
}

// Manual Debug impls so a plaintext password can never reach a log line.
impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("surname", &self.surname)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

impl std::fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPatch")
            .field("name", &self.name)
            .field("surname", &self.surname)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

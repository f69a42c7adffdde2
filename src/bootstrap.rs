//! Default role and user seeding.
//!
//! Called once by the process startup sequence, after the schema is in
//! place. The emptiness check on the role catalog makes it safe to call on
//! every start.

use crate::directory_service::UserDirectoryService;
use crate::entities::{NewUser, Role};
use crate::errors_service::UserDirectoryError;
use crate::password::PasswordHasherTrait;
use crate::repository::models::RoleRow;
use crate::repository::traits::{RoleRepositoryTrait, UserRepositoryTrait};
use uuid::Uuid;

pub const ADMIN_ROLE_NAME: &str = "ROLE_ADMIN";
pub const USER_ROLE_NAME: &str = "ROLE_USER";

/// Credentials for the two seed accounts. Defaults are fixed; the
/// environment can override them for deployments.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub admin_email: String,
    pub admin_password: String,
    pub user_email: String,
    pub user_password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@mail.ru".to_string(),
            admin_password: "admin".to_string(),
            user_email: "user@mail.ru".to_string(),
            user_password: "user".to_string(),
        }
    }
}

impl SeedConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            admin_email: std::env::var("SEED_ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_password: std::env::var("SEED_ADMIN_PASSWORD")
                .unwrap_or(defaults.admin_password),
            user_email: std::env::var("SEED_USER_EMAIL").unwrap_or(defaults.user_email),
            user_password: std::env::var("SEED_USER_PASSWORD").unwrap_or(defaults.user_password),
        }
    }
}

/// Converts a freshly inserted catalog row for attachment to a seed user.
fn seeded_role(row: RoleRow) -> Result<Role, UserDirectoryError> {
    let id = Uuid::parse_str(&row.id).map_err(|_| UserDirectoryError::InvalidUuid(row.id.clone()))?;
    Ok(Role { id, name: row.name })
}

/// Seeds the role catalog and the two default accounts.
///
/// When the catalog is empty this creates the admin and standard roles, then
/// an admin account holding both and a standard account holding only the
/// standard role. Any existing role makes the whole routine a no-op, so
/// running it twice never duplicates roles or seed users.
pub async fn bootstrap<U, R, H>(
    service: &UserDirectoryService<U, R, H>,
    config: &SeedConfig,
) -> Result<(), UserDirectoryError>
where
    U: UserRepositoryTrait,
    R: RoleRepositoryTrait,
    H: PasswordHasherTrait,
{
    let existing = service
        .role_repo
        .count_roles()
        .await
        .map_err(UserDirectoryError::from)?;
    if existing > 0 {
        tracing::info!(roles = existing, "role catalog already seeded, skipping bootstrap");
        return Ok(());
    }

    tracing::info!("seeding default roles and users");

    let admin_role = service
        .role_repo
        .create_role(ADMIN_ROLE_NAME)
        .await
        .map_err(UserDirectoryError::from)?;
    let user_role = service
        .role_repo
        .create_role(USER_ROLE_NAME)
        .await
        .map_err(UserDirectoryError::from)?;

    let admin_role = seeded_role(admin_role)?;
    let user_role = seeded_role(user_role)?;

    let admin = service
        .create_user(NewUser {
            name: "Admin".to_string(),
            surname: "Adminov".to_string(),
            email: config.admin_email.clone(),
            password: config.admin_password.clone(),
            roles: vec![admin_role, user_role.clone()],
        })
        .await?;

    let user = service
        .create_user(NewUser {
            name: "User".to_string(),
            surname: "Userov".to_string(),
            email: config.user_email.clone(),
            password: config.user_password.clone(),
            roles: vec![user_role],
        })
        .await?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        "default roles and users seeded"
    );

    Ok(())
}

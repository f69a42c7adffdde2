use crate::entities::{NewUser, Role, User, UserPatch};
use crate::errors_service::UserDirectoryError;
use crate::password::{BcryptPasswordHasher, PasswordHasherTrait};
use crate::repository::models::{RoleRow, UserRoleMapping, UserRow};
use crate::repository::traits::{RoleRepositoryTrait, UserRepositoryTrait};
use crate::repository::{RoleRepository, UserRepository};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

fn parse_uuid(s: &str) -> Result<Uuid, UserDirectoryError> {
    Uuid::parse_str(s).map_err(|_| UserDirectoryError::InvalidUuid(s.to_string()))
}

fn role_from_row(row: RoleRow) -> Result<Role, UserDirectoryError> {
    Ok(Role {
        id: parse_uuid(&row.id)?,
        name: row.name,
    })
}

fn role_from_mapping(mapping: UserRoleMapping) -> Result<(String, Role), UserDirectoryError> {
    let role = Role {
        id: parse_uuid(&mapping.role_id)?,
        name: mapping.role_name,
    };
    Ok((mapping.user_id, role))
}

fn user_from_row(row: UserRow, roles: Vec<Role>) -> Result<User, UserDirectoryError> {
    Ok(User {
        id: parse_uuid(&row.id)?,
        name: row.name,
        surname: row.surname,
        email: row.email,
        password_hash: row.password_hash,
        roles,
    })
}

fn validate_email(email: &str) -> Result<(), UserDirectoryError> {
    if email.trim().is_empty() {
        return Err(UserDirectoryError::Validation(
            "email is required".to_string(),
        ));
    }
    Ok(())
}

/// Collapses duplicate ids while keeping first-seen order; membership is a set.
fn dedup_role_ids(role_ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(role_ids.len());
    for id in role_ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

/// Owns the lifecycle of user records and their role memberships.
///
/// Composed explicitly from its collaborators: a user repository, the role
/// catalog, and the password hasher. All persisted passwords pass through the
/// hasher exactly once (see `resolve_password` for the update rules).
#[derive(Debug, Clone)]
pub struct UserDirectoryService<U = UserRepository, R = RoleRepository, H = BcryptPasswordHasher>
where
    U: UserRepositoryTrait,
    R: RoleRepositoryTrait,
    H: PasswordHasherTrait,
{
    pub user_repo: Arc<U>,
    pub role_repo: Arc<R>,
    pub hasher: Arc<H>,
}

impl UserDirectoryService<UserRepository, RoleRepository, BcryptPasswordHasher> {
    pub fn new(user_repo: UserRepository, role_repo: RoleRepository) -> Self {
        Self {
            user_repo: Arc::new(user_repo),
            role_repo: Arc::new(role_repo),
            hasher: Arc::new(BcryptPasswordHasher::new()),
        }
    }
}

impl<U, R, H> UserDirectoryService<U, R, H>
where
    U: UserRepositoryTrait,
    R: RoleRepositoryTrait,
    H: PasswordHasherTrait,
{
    pub fn with_collaborators(user_repo: Arc<U>, role_repo: Arc<R>, hasher: Arc<H>) -> Self {
        Self {
            user_repo,
            role_repo,
            hasher,
        }
    }

    async fn fetch_roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, UserDirectoryError> {
        self.role_repo
            .get_roles_for_user(user_id)
            .await
            .map_err(UserDirectoryError::from)?
            .into_iter()
            .map(role_from_row)
            .collect()
    }

    async fn build_users_with_roles(
        &self,
        user_rows: Vec<UserRow>,
    ) -> Result<Vec<User>, UserDirectoryError> {
        if user_rows.is_empty() {
            return Ok(vec![]);
        }

        let user_ids: Vec<String> = user_rows.iter().map(|r| r.id.clone()).collect();
        let role_mappings = self
            .role_repo
            .get_roles_for_users(&user_ids)
            .await
            .map_err(UserDirectoryError::from)?;

        let mut roles_by_user: HashMap<String, Vec<Role>> = HashMap::new();
        for mapping in role_mappings {
            let (user_id, role) = role_from_mapping(mapping)?;
            roles_by_user.entry(user_id).or_default().push(role);
        }

        user_rows
            .into_iter()
            .map(|row| {
                let roles = roles_by_user.remove(&row.id).unwrap_or_default();
                user_from_row(row, roles)
            })
            .collect()
    }

    /// Resolves every id against the catalog before anything is written, so
    /// an unknown id aborts the operation with prior state untouched.
    async fn resolve_roles(&self, role_ids: &[Uuid]) -> Result<Vec<Role>, UserDirectoryError> {
        let mut roles = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            let row = self
                .role_repo
                .get_role(*role_id)
                .await
                .map_err(UserDirectoryError::from)?
                .ok_or(UserDirectoryError::NotFound)?;
            roles.push(role_from_row(row)?);
        }
        Ok(roles)
    }

    /// Decides what hash to store on update. An absent or empty value keeps
    /// the existing hash; a value carrying the hasher's prefix marker is an
    /// already-hashed round-trip and is stored verbatim; anything else is new
    /// plaintext and gets hashed.
    fn resolve_password(
        &self,
        submitted: Option<&str>,
        existing_hash: &str,
    ) -> Result<String, UserDirectoryError> {
        match submitted {
            None => Ok(existing_hash.to_string()),
            Some(p) if p.is_empty() => Ok(existing_hash.to_string()),
            Some(p) if self.hasher.is_hashed(p) => Ok(p.to_string()),
            Some(p) => self
                .hasher
                .hash_password(p)
                .map_err(UserDirectoryError::Internal),
        }
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User, UserDirectoryError> {
        validate_email(&new_user.email)?;

        if self
            .user_repo
            .email_exists(&new_user.email)
            .await
            .map_err(UserDirectoryError::from)?
        {
            return Err(UserDirectoryError::EmailAlreadyExists);
        }

        if new_user.password.is_empty() {
            return Err(UserDirectoryError::Validation(
                "password is required".to_string(),
            ));
        }

        let password_hash = self
            .hasher
            .hash_password(&new_user.password)
            .map_err(UserDirectoryError::Internal)?;

        let role_ids: Vec<Uuid> = new_user.roles.iter().map(|r| r.id).collect();
        let role_ids = dedup_role_ids(&role_ids);

        let row = self
            .user_repo
            .create_user(
                &new_user.name,
                &new_user.surname,
                &new_user.email,
                &password_hash,
                &role_ids,
            )
            .await
            .map_err(UserDirectoryError::from)?;

        tracing::info!(user_id = %row.id, email = %row.email, "user created");

        let user_id = parse_uuid(&row.id)?;
        let roles = self.fetch_roles_for_user(user_id).await?;
        user_from_row(row, roles)
    }

    pub async fn update_user(
        &self,
        user_id: Uuid,
        patch: UserPatch,
        role_ids: &[Uuid],
    ) -> Result<User, UserDirectoryError> {
        let existing = self
            .user_repo
            .get_user(user_id)
            .await
            .map_err(UserDirectoryError::from)?
            .ok_or(UserDirectoryError::NotFound)?;

        validate_email(&patch.email)?;

        let role_ids = dedup_role_ids(role_ids);
        let roles = self.resolve_roles(&role_ids).await?;

        let password_hash =
            self.resolve_password(patch.password.as_deref(), &existing.password_hash)?;

        let row = self
            .user_repo
            .update_user(
                user_id,
                &patch.name,
                &patch.surname,
                &patch.email,
                &password_hash,
                &role_ids,
            )
            .await
            .map_err(UserDirectoryError::from)?;

        tracing::info!(user_id = %user_id, email = %row.email, "user updated");

        user_from_row(row, roles)
    }

    /// Hard delete. Removing an id with no record is a no-op, so retried
    /// deletes stay safe.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), UserDirectoryError> {
        self.user_repo
            .delete_user(user_id)
            .await
            .map_err(UserDirectoryError::from)?;

        tracing::info!(user_id = %user_id, "user deleted");
        Ok(())
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, UserDirectoryError> {
        let user_row = self
            .user_repo
            .get_user(user_id)
            .await
            .map_err(UserDirectoryError::from)?;
        match user_row {
            Some(row) => {
                let roles = self.fetch_roles_for_user(parse_uuid(&row.id)?).await?;
                Ok(Some(user_from_row(row, roles)?))
            }
            None => Ok(None),
        }
    }

    pub async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, UserDirectoryError> {
        let user_row = self
            .user_repo
            .get_user_by_email(email)
            .await
            .map_err(UserDirectoryError::from)?;
        match user_row {
            Some(row) => {
                let roles = self.fetch_roles_for_user(parse_uuid(&row.id)?).await?;
                Ok(Some(user_from_row(row, roles)?))
            }
            None => Ok(None),
        }
    }

    pub async fn get_users(&self) -> Result<Vec<User>, UserDirectoryError> {
        let user_rows = self
            .user_repo
            .get_users()
            .await
            .map_err(UserDirectoryError::from)?;
        self.build_users_with_roles(user_rows).await
    }

    /// Lookup for the authentication collaborator. Unlike the plain read
    /// paths this fails on a miss, because the caller needs a definite error
    /// to short-circuit credential verification.
    pub async fn authentication_lookup(&self, email: &str) -> Result<User, UserDirectoryError> {
        self.get_user_by_email(email)
            .await?
            .ok_or_else(|| UserDirectoryError::AuthenticationLookup(email.to_string()))
    }

    pub async fn get_role(&self, role_id: Uuid) -> Result<Option<Role>, UserDirectoryError> {
        let role_row = self
            .role_repo
            .get_role(role_id)
            .await
            .map_err(UserDirectoryError::from)?;
        role_row.map(role_from_row).transpose()
    }

    pub async fn get_roles(&self) -> Result<Vec<Role>, UserDirectoryError> {
        self.role_repo
            .get_roles()
            .await
            .map_err(UserDirectoryError::from)?
            .into_iter()
            .map(role_from_row)
            .collect()
    }
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::repository::errors::UserRepositoryError;
use crate::repository::models::{RoleRow, UserRoleMapping, UserRow};

/// Persistence for user records and their role memberships. `create_user`
/// and `update_user` take the full membership set and must apply it in the
/// same transaction as the row write, so a failure leaves no partial state.
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn create_user(
        &self,
        name: &str,
        surname: &str,
        email: &str,
        password_hash: &str,
        role_ids: &[Uuid],
    ) -> Result<UserRow, UserRepositoryError>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, UserRepositoryError>;
    async fn get_user_by_email(&self, email: &str)
        -> Result<Option<UserRow>, UserRepositoryError>;
    async fn email_exists(&self, email: &str) -> Result<bool, UserRepositoryError>;
    async fn update_user(
        &self,
        user_id: Uuid,
        name: &str,
        surname: &str,
        email: &str,
        password_hash: &str,
        role_ids: &[Uuid],
    ) -> Result<UserRow, UserRepositoryError>;
    async fn delete_user(&self, user_id: Uuid) -> Result<(), UserRepositoryError>;
    async fn get_users(&self) -> Result<Vec<UserRow>, UserRepositoryError>;
}

/// Read access to the role catalog, plus the single write used by the seed
/// routine. Roles are otherwise immutable during normal operation.
#[async_trait]
pub trait RoleRepositoryTrait: Send + Sync {
    async fn create_role(&self, name: &str) -> Result<RoleRow, UserRepositoryError>;
    async fn get_role(&self, role_id: Uuid) -> Result<Option<RoleRow>, UserRepositoryError>;
    async fn get_roles(&self) -> Result<Vec<RoleRow>, UserRepositoryError>;
    async fn count_roles(&self) -> Result<u64, UserRepositoryError>;
    async fn get_roles_for_user(&self, user_id: Uuid)
        -> Result<Vec<RoleRow>, UserRepositoryError>;
    async fn get_roles_for_users(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<UserRoleMapping>, UserRepositoryError>;
}

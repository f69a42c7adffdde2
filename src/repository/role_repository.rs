use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, SqlitePool};
use uuid::Uuid;

use crate::repository::errors::{map_sqlx_error, UserRepositoryError};
use crate::repository::models::{RoleRow, UserRoleMapping};
use crate::repository::traits::RoleRepositoryTrait;

#[derive(Debug, Clone)]
pub struct RoleRepository {
    pub pool: SqlitePool,
}

impl RoleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepositoryTrait for RoleRepository {
    async fn create_role(&self, name: &str) -> Result<RoleRow, UserRepositoryError> {
        let id = Uuid::new_v4();
        query(
            r#"
            INSERT INTO roles (id, name)
            VALUES (?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let role = query_as::<_, RoleRow>(r#"SELECT id, name FROM roles WHERE id = ?"#)
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(role)
    }

    async fn get_role(&self, role_id: Uuid) -> Result<Option<RoleRow>, UserRepositoryError> {
        let role = query_as::<_, RoleRow>(
            r#"
            SELECT id, name FROM roles WHERE id = ?
            "#,
        )
        .bind(role_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(role)
    }

    async fn get_roles(&self) -> Result<Vec<RoleRow>, UserRepositoryError> {
        let roles = query_as::<_, RoleRow>(
            r#"
            SELECT id, name FROM roles ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(roles)
    }

    async fn count_roles(&self) -> Result<u64, UserRepositoryError> {
        let count: i64 = query_scalar(
            r#"
            SELECT COUNT(*) FROM roles
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(count as u64)
    }

    async fn get_roles_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RoleRow>, UserRepositoryError> {
        let roles = query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.name
            FROM roles r
            JOIN user_roles ur ON r.id = ur.role_id
            WHERE ur.user_id = ?
            ORDER BY r.name
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(roles)
    }

    async fn get_roles_for_users(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<UserRoleMapping>, UserRepositoryError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let placeholders = vec!["?"; user_ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT ur.user_id, ur.role_id, r.name AS role_name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id IN ({placeholders})
            "#
        );

        let mut q = query_as::<_, UserRoleMapping>(&sql);
        for id in user_ids {
            q = q.bind(id);
        }

        let mappings = q.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        Ok(mappings)
    }
}

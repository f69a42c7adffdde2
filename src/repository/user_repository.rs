use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, SqlitePool};
use uuid::Uuid;

use crate::repository::errors::{map_sqlx_error, UserRepositoryError};
use crate::repository::models::UserRow;
use crate::repository::traits::UserRepositoryTrait;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pub pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create_user(
        &self,
        name: &str,
        surname: &str,
        email: &str,
        password_hash: &str,
        role_ids: &[Uuid],
    ) -> Result<UserRow, UserRepositoryError> {
        let user_id = Uuid::new_v4();

        // Row and memberships commit together or not at all. The transaction
        // rolls back on drop for every early return below.
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        query(
            r#"
            INSERT INTO users (id, name, surname, email, password_hash)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id.to_string())
        .bind(name)
        .bind(surname)
        .bind(email)
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        for role_id in role_ids {
            query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                VALUES (?, ?)
                "#,
            )
            .bind(user_id.to_string())
            .bind(role_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        let user = query_as::<_, UserRow>(
            r#"
            SELECT id, name, surname, email, password_hash FROM users WHERE id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, UserRepositoryError> {
        let user = query_as::<_, UserRow>(
            r#"
            SELECT id, name, surname, email, password_hash FROM users WHERE id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(user)
    }

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserRow>, UserRepositoryError> {
        let user = query_as::<_, UserRow>(
            r#"
            SELECT id, name, surname, email, password_hash FROM users WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, UserRepositoryError> {
        let count: i64 = query_scalar(
            r#"
            SELECT COUNT(*) FROM users WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count > 0)
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        name: &str,
        surname: &str,
        email: &str,
        password_hash: &str,
        role_ids: &[Uuid],
    ) -> Result<UserRow, UserRepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = query(
            r#"
            UPDATE users
            SET name = ?, surname = ?, email = ?, password_hash = ?
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(surname)
        .bind(email)
        .bind(password_hash)
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(UserRepositoryError::NotFound);
        }

        // Full reconciliation: clear the membership set, then re-add the
        // requested ids, all inside the transaction opened above.
        query(
            r#"
            DELETE FROM user_roles WHERE user_id = ?
            "#,
        )
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        for role_id in role_ids {
            query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                VALUES (?, ?)
                "#,
            )
            .bind(user_id.to_string())
            .bind(role_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        let user = query_as::<_, UserRow>(
            r#"
            SELECT id, name, surname, email, password_hash FROM users WHERE id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(user)
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), UserRepositoryError> {
        // Single statement; memberships go with the row via ON DELETE CASCADE.
        query(
            r#"
            DELETE FROM users WHERE id = ?
            "#,
        )
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn get_users(&self) -> Result<Vec<UserRow>, UserRepositoryError> {
        let users = query_as::<_, UserRow>(
            r#"
            SELECT id, name, surname, email, password_hash FROM users ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(users)
    }
}

use crate::repository::errors::UserRepositoryError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UserDirectoryError {
    #[error("email already exists")]
    EmailAlreadyExists,

    #[error("role name already exists")]
    RoleNameAlreadyExists,

    #[error("resource not found")]
    NotFound,

    #[error("no user found for email {0}")]
    AuthenticationLookup(String),

    #[error("invalid UUID in database: {0}")]
    InvalidUuid(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<UserRepositoryError> for UserDirectoryError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::EmailAlreadyExists => UserDirectoryError::EmailAlreadyExists,
            UserRepositoryError::RoleNameAlreadyExists => UserDirectoryError::RoleNameAlreadyExists,
            UserRepositoryError::NotFound => UserDirectoryError::NotFound,
            UserRepositoryError::Sqlx(e) => UserDirectoryError::Internal(e.into()),
        }
    }
}

#[derive(Debug)]
pub enum UserRepositoryError {
    EmailAlreadyExists,
    RoleNameAlreadyExists,
    NotFound,
    Sqlx(sqlx::Error),
}

impl std::fmt::Display for UserRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRepositoryError::EmailAlreadyExists => write!(f, "email already exists"),
            UserRepositoryError::RoleNameAlreadyExists => write!(f, "role name already exists"),
            UserRepositoryError::NotFound => write!(f, "not found"),
            UserRepositoryError::Sqlx(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for UserRepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UserRepositoryError::EmailAlreadyExists => None,
            UserRepositoryError::RoleNameAlreadyExists => None,
            UserRepositoryError::NotFound => None,
            UserRepositoryError::Sqlx(e) => Some(e),
        }
    }
}

impl From<sqlx::Error> for UserRepositoryError {
    fn from(value: sqlx::Error) -> Self {
        map_sqlx_error(value)
    }
}

pub fn map_sqlx_error(err: sqlx::Error) -> UserRepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        // SQLite unique violations surface as SQLITE_CONSTRAINT_UNIQUE with a
        // message naming the column, e.g.
        // "UNIQUE constraint failed: users.email"
        let msg = db_err.message().to_lowercase();

        if msg.contains("unique constraint failed") {
            if msg.contains("users.email") {
                return UserRepositoryError::EmailAlreadyExists;
            }
            if msg.contains("roles.name") {
                return UserRepositoryError::RoleNameAlreadyExists;
            }
        }

        // A membership insert referencing a role (or user) id that does not
        // exist trips the foreign key. The service resolves role ids against
        // the catalog first, so this is a backstop for racing deletes.
        if msg.contains("foreign key constraint failed") {
            return UserRepositoryError::NotFound;
        }
    }

    if matches!(err, sqlx::Error::RowNotFound) {
        return UserRepositoryError::NotFound;
    }

    UserRepositoryError::Sqlx(err)
}

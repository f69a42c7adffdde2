use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct RoleRow {
    pub id: String,
    pub name: String,
}

/// One membership edge, joined with the role name so callers can group
/// roles per user without a second query.
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleMapping {
    pub user_id: String,
    pub role_id: String,
    pub role_name: String,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Superadmin,
}

impl Role {
    /// The authorization policy, in one place: superadmin is a strict
    /// superset of admin. Both route guards and handlers go through this.
    pub fn satisfies(self, required: Role) -> bool {
        match required {
            Role::Admin => matches!(self, Role::Admin | Role::Superadmin),
            Role::Superadmin => matches!(self, Role::Superadmin),
        }
    }
}

// A staff user as stored in the users collection.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,

    #[serde(skip_serializing)] // never goes on the wire
    pub password_hash: String,

    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// The slice of a user kept in the session store and attached to requests.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

// Seeding input; the password is hashed before it reaches storage.
#[derive(Debug, Clone)]
pub struct InsertUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "username is required"))]
    #[schema(example = "nadia")]
    pub username: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: SessionUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superadmin_satisfies_both_roles() {
        assert!(Role::Superadmin.satisfies(Role::Admin));
        assert!(Role::Superadmin.satisfies(Role::Superadmin));
    }

    #[test]
    fn admin_does_not_satisfy_superadmin() {
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(!Role::Admin.satisfies(Role::Superadmin));
    }
}

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::auth::{Role, SessionUser},
};

/// 1. The trait that names a required role
pub trait RoleDef: Send + Sync + 'static {
    fn required() -> Role;
    fn denial_message() -> &'static str;
}

/// 2. The extractor (gatekeeper). Declaring it as a handler argument gates
/// the route: 401 without a session, 403 when the role does not satisfy
/// the requirement. It hands the session user to the handler so audit
/// entries know who acted.
pub struct RequireRole<T> {
    pub user: SessionUser,
    _role: PhantomData<T>,
}

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. The session user placed there by the auth guard
        let user = parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .ok_or(AppError::NotAuthenticated)?;

        // B. The single policy decides; handlers never compare roles.
        if !user.role.satisfies(T::required()) {
            return Err(AppError::Forbidden(T::denial_message()));
        }

        Ok(RequireRole {
            user,
            _role: PhantomData,
        })
    }
}

// ---
// ROLE GATES
// ---

pub struct AdminAccess;
impl RoleDef for AdminAccess {
    fn required() -> Role {
        Role::Admin
    }
    fn denial_message() -> &'static str {
        "Admin access required"
    }
}

pub struct SuperadminAccess;
impl RoleDef for SuperadminAccess {
    fn required() -> Role {
        Role::Superadmin
    }
    fn denial_message() -> &'static str {
        "Superadmin access required"
    }
}

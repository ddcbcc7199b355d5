use std::sync::Arc;

use crate::{common::error::AppError, db::Storage, models::auth::User};

#[derive(Clone)]
pub struct AuthService {
    storage: Arc<dyn Storage>,
}

impl AuthService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Verifies the credentials and returns the user. Unknown username and
    /// wrong password are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .storage
            .get_user_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();

        // bcrypt is deliberately slow; keep it off the async workers.
        let is_valid = tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("password verification task failed: {e}"))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }
}

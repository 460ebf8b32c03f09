//! The five user operations, independent of HTTP.

use crate::error::{Result, ServiceError};
use crate::model::{User, UserId, UserPayload};
use crate::storage::UserStore;
use crate::validation::validate_user;
use std::sync::Arc;
use tracing::{debug, info};

/// Parses a path segment as a user id.
///
/// Accepts an optional sign, as `str::parse::<i64>` does.
pub fn parse_user_id(raw: &str) -> Result<UserId> {
    raw.parse::<UserId>().map_err(|_| ServiceError::InvalidId)
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        debug!("Fetching all users");
        self.store.list().await
    }

    pub async fn get_user(&self, raw_id: &str) -> Result<User> {
        let id = parse_user_id(raw_id)?;
        debug!("Fetching user by ID: {}", id);

        self.store.get(id).await?.ok_or(ServiceError::NotFound(id))
    }

    pub async fn create_user(&self, payload: UserPayload) -> Result<User> {
        let new_user = validate_user(&payload)?;
        let user = self.store.insert(new_user).await?;

        info!("Created user {} ({})", user.id, user.name);
        Ok(user)
    }

    /// Replaces the whole record; the id always comes from `raw_id`.
    pub async fn update_user(&self, raw_id: &str, payload: UserPayload) -> Result<User> {
        let id = parse_user_id(raw_id)?;
        let new_user = validate_user(&payload)?;

        let user = self
            .store
            .replace(id, new_user)
            .await?
            .ok_or(ServiceError::NotFound(id))?;

        info!("Updated user {}", id);
        Ok(user)
    }

    pub async fn delete_user(&self, raw_id: &str) -> Result<()> {
        let id = parse_user_id(raw_id)?;

        if !self.store.remove(id).await? {
            return Err(ServiceError::NotFound(id));
        }

        info!("Deleted user {}", id);
        Ok(())
    }
}

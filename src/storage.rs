use crate::config::ServiceConfig;
use crate::error::Result;
use crate::model::{NewUser, User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// All records in insertion order.
    async fn list(&self) -> Result<Vec<User>>;
    async fn get(&self, id: UserId) -> Result<Option<User>>;
    /// Appends a record under a fresh id and returns it.
    async fn insert(&self, user: NewUser) -> Result<User>;
    /// Replaces the record with `id` in place. `None` if there is none.
    async fn replace(&self, id: UserId, user: NewUser) -> Result<Option<User>>;
    async fn remove(&self, id: UserId) -> Result<bool>;
}

/// Ordered in-memory collection.
///
/// New ids are derived from the current maximum, not a counter: deleting the
/// highest id and then creating a record hands the same id out again.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store holding `seed`, numbered from 1 in order.
    pub fn with_users(seed: Vec<NewUser>) -> Self {
        let users = seed
            .into_iter()
            .zip(1..)
            .map(|(user, id)| User::from_new(id, user))
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }
}

fn next_id(users: &[User]) -> UserId {
    users.iter().map(|u| u.id).max().unwrap_or(0) + 1
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        let user = User::from_new(next_id(&users), user);
        users.push(user.clone());
        Ok(user)
    }

    async fn replace(&self, id: UserId, user: NewUser) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.iter_mut().find(|u| u.id == id).map(|slot| {
            *slot = User::from_new(id, user);
            slot.clone()
        }))
    }

    async fn remove(&self, id: UserId) -> Result<bool> {
        let mut users = self.users.write().await;
        match users.iter().position(|u| u.id == id) {
            Some(index) => {
                users.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

pub fn create_store(config: &ServiceConfig) -> Arc<dyn UserStore> {
    Arc::new(MemoryStore::with_users(config.seed.clone()))
}

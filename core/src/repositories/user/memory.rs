//! In-memory user repository used by tests and local runs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

use super::r#trait::UserRepository;

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<i64, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create(&self, mut user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(DomainError::Internal {
                message: format!("User with email {} already exists", user.email),
            });
        }

        // Honour explicit ids so tests can pin them
        if user.id == 0 {
            user.id = users.keys().max().copied().unwrap_or(0) + 1;
        } else if users.contains_key(&user.id) {
            return Err(DomainError::Internal {
                message: format!("User with id {} already exists", user.id),
            });
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<bool, DomainError> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.is_active = is_active;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

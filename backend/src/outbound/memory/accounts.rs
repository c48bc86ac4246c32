//! In-memory `AccountRepository`.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{EmailAddress, GeoPoint, NearbyUser, SearchRadius, User, UserId};

/// Account table keyed by id with a unique email index.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(users: &HashMap<UserId, User>, email: &EmailAddress, owner: &UserId) -> bool {
        users
            .values()
            .any(|user| user.email() == email && user.id() != owner)
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, user: &User) -> Result<(), AccountRepositoryError> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if Self::email_taken(&users, user.email(), user.id()) {
            return Err(AccountRepositoryError::duplicate_email(user.email().as_ref()));
        }
        if users.contains_key(user.id()) {
            return Err(AccountRepositoryError::query(format!(
                "user {} already exists",
                user.id()
            )));
        }
        users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountRepositoryError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, AccountRepositoryError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users.values().find(|user| user.email() == email).cloned())
    }

    async fn update(&self, user: &User) -> Result<(), AccountRepositoryError> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if Self::email_taken(&users, user.email(), user.id()) {
            return Err(AccountRepositoryError::duplicate_email(user.email().as_ref()));
        }
        match users.get_mut(user.id()) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(AccountRepositoryError::query(format!(
                "user {} not found",
                user.id()
            ))),
        }
    }

    async fn find_within_radius(
        &self,
        center: GeoPoint,
        radius: SearchRadius,
        exclude: &UserId,
    ) -> Result<Vec<NearbyUser>, AccountRepositoryError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        let mut nearby: Vec<NearbyUser> = users
            .values()
            .filter(|user| user.id() != exclude)
            .filter_map(|user| {
                let distance_meters = center.distance_meters(&user.location()?);
                (distance_meters <= radius.meters()).then(|| NearbyUser {
                    id: user.id().clone(),
                    email: user.email().clone(),
                    display_name: user.display_name().clone(),
                    distance_meters,
                })
            })
            .collect();
        nearby.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
        Ok(nearby)
    }
}

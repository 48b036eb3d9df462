use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::config::FilterConfig;
use crate::database::models::user::{CreateUserRequest, UpdateUserRequest, User, UserChangeset};
use crate::database::UserStore;
use crate::filter::{Filter, ListParams, UserSort};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    filter: FilterConfig,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, filter: FilterConfig) -> Self {
        Self { store, filter }
    }

    pub async fn create(&self, req: CreateUserRequest) -> Result<User, ServiceError> {
        let new_user = req.into_new_user()?;
        let user = self.store.create_user(new_user).await?;
        info!("Created user {} in company {}", user.id, user.company);
        Ok(user)
    }

    pub async fn list(&self, params: ListParams) -> Result<Vec<User>, ServiceError> {
        let filter = Filter::<UserSort>::from_params(params, &self.filter)?;
        Ok(self.store.list_users(&filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ServiceError> {
        Ok(self.store.get_user(id).await?)
    }

    /// Partial update. An unknown member is reported before any field check.
    pub async fn update(&self, id: Uuid, req: UpdateUserRequest) -> Result<User, ServiceError> {
        self.store.get_user(id).await?;
        let changes = UserChangeset::try_from(req)?;
        Ok(self.store.update_user(id, &changes).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.store.delete_user(id).await?;
        info!("Deleted user {}", id);
        Ok(())
    }
}

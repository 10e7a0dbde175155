use error_types::{DatabaseError, ServiceError, ServiceResult};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::Event;
use crate::repository::FavoriteRepository;

pub struct FavoriteService {
    favorites: FavoriteRepository,
}

impl FavoriteService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            favorites: FavoriteRepository::new(pool),
        }
    }

    pub async fn add(&self, user_id: Uuid, event_id: Uuid) -> ServiceResult<()> {
        let inserted = self
            .favorites
            .insert(user_id, event_id)
            .await
            .map_err(|e| match DatabaseError::from(e) {
                err if err.is_foreign_key_violation() => match err.constraint() {
                    Some(c) if c.contains("user") => ServiceError::not_found("user"),
                    _ => ServiceError::not_found("event"),
                },
                err => ServiceError::from(err),
            })?;

        if !inserted {
            return Err(ServiceError::conflict("event already in favorites"));
        }
        info!(event = "favorite_added", user_id = %user_id, event_id = %event_id);
        Ok(())
    }

    pub async fn remove(&self, user_id: Uuid, event_id: Uuid) -> ServiceResult<()> {
        if !self.favorites.delete(user_id, event_id).await? {
            return Err(ServiceError::not_found("favorite"));
        }
        info!(event = "favorite_removed", user_id = %user_id, event_id = %event_id);
        Ok(())
    }

    pub async fn list(&self, user_id: Uuid, limit: i64, offset: i64) -> ServiceResult<Vec<Event>> {
        Ok(self.favorites.list(user_id, limit, offset).await?)
    }
}

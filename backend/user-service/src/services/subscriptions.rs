use error_types::{DatabaseError, ServiceError, ServiceResult};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::UserCard;
use crate::repository::SubscriptionRepository;

pub struct SubscriptionService {
    subscriptions: SubscriptionRepository,
}

impl SubscriptionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            subscriptions: SubscriptionRepository::new(pool),
        }
    }

    pub async fn subscribe(&self, subscriber_id: Uuid, followed_id: Uuid) -> ServiceResult<()> {
        if subscriber_id == followed_id {
            return Err(ServiceError::invalid_input("cannot subscribe to yourself"));
        }

        let inserted = self
            .subscriptions
            .insert(subscriber_id, followed_id)
            .await
            .map_err(|e| match DatabaseError::from(e) {
                err if err.is_foreign_key_violation() => ServiceError::not_found("user"),
                err => ServiceError::from(err),
            })?;

        if !inserted {
            return Err(ServiceError::conflict("already subscribed"));
        }

        info!(
            event = "subscribed",
            subscriber_id = %subscriber_id,
            followed_id = %followed_id
        );
        Ok(())
    }

    pub async fn unsubscribe(&self, subscriber_id: Uuid, followed_id: Uuid) -> ServiceResult<()> {
        if !self.subscriptions.delete(subscriber_id, followed_id).await? {
            return Err(ServiceError::not_found("subscription"));
        }

        info!(
            event = "unsubscribed",
            subscriber_id = %subscriber_id,
            followed_id = %followed_id
        );
        Ok(())
    }

    pub async fn is_subscribed(&self, subscriber_id: Uuid, followed_id: Uuid) -> ServiceResult<bool> {
        Ok(self.subscriptions.exists(subscriber_id, followed_id).await?)
    }

    pub async fn subscribers(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<(Vec<UserCard>, i64)> {
        let users = self
            .subscriptions
            .list_subscribers(user_id, limit, offset)
            .await?;
        let total = self.subscriptions.count_subscribers(user_id).await?;
        Ok((users, total))
    }

    pub async fn subscriptions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<(Vec<UserCard>, i64)> {
        let users = self
            .subscriptions
            .list_subscriptions(user_id, limit, offset)
            .await?;
        let total = self.subscriptions.count_subscriptions(user_id).await?;
        Ok((users, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SubscriptionService {
        let pool = PgPool::connect_lazy("postgres://unused@localhost/unused").unwrap();
        SubscriptionService::new(pool)
    }

    #[tokio::test]
    async fn test_self_subscription_is_rejected_before_touching_the_database() {
        let id = Uuid::new_v4();

        let err = service().subscribe(id, id).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidInput { ref message } if message == "cannot subscribe to yourself"));
        assert_eq!(err.to_status().code(), tonic::Code::InvalidArgument);
    }
}

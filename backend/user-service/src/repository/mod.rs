pub mod subscriptions;
pub mod users;

pub use subscriptions::SubscriptionRepository;
pub use users::UserRepository;

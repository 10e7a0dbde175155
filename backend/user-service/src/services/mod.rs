pub mod profile;
pub mod subscriptions;

pub use profile::ProfileService;
pub use subscriptions::SubscriptionService;

pub mod events;
pub mod favorites;

pub use events::EventService;
pub use favorites::FavoriteService;

pub mod categories;
pub mod events;
pub mod favorites;

pub use categories::CategoryRepository;
pub use events::EventRepository;
pub use favorites::FavoriteRepository;

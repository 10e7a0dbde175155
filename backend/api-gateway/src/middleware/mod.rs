pub mod csrf;
pub mod session;

pub use csrf::CsrfMiddleware;
pub use session::{AuthenticatedUser, SessionMiddleware, SessionToken, SessionValidator};

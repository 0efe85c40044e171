pub mod token;
pub mod user;

pub use token::{InMemoryRefreshTokenRepository, RefreshTokenRepository};
pub use user::{InMemoryUserRepository, UserRepository};

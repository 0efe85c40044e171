//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management
//! - Refresh token and user repositories
//! - Embedded migrations

pub mod connection;
pub mod mysql;


pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlRefreshTokenRepository, MySqlUserRepository};

pub mod auth;
pub mod refresh;
pub mod role;

pub use auth::*;
pub use refresh::*;
pub use role::*;

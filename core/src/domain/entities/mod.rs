//! Domain entities representing core business objects.

pub mod token;
pub mod user;

// Re-export commonly used types
pub use token::{
    AccessTokenClaims, Principal, RefreshTokenClaims, RefreshTokenRecord, TokenPair,
    ACCESS_TOKEN_EXPIRY_SECONDS, JWT_ISSUER, REFRESH_TOKEN_EXPIRY_SECONDS,
};
pub use user::{Role, User};

#[cfg(test)]
mod tests;

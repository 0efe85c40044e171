//! Session lifecycle: starting a session, refresh token rotation and logout

mod service;

#[cfg(test)]
mod tests;

pub use service::SessionService;

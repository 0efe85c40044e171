//! Session cookies
//!
//! Both tokens are set httpOnly and SameSite=Strict, each with a max-age
//! equal to its token lifetime.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpResponse;
use auth_core::domain::entities::token::TokenPair;
use auth_shared::CookieConfig;

fn session_cookie(config: &CookieConfig, name: &str, value: String, max_age_seconds: i64) -> Cookie<'static> {
    let mut cookie = Cookie::build(name.to_string(), value)
        .path(config.path.clone())
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(max_age_seconds))
        .finish();

    if let Some(domain) = &config.domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

/// Access and refresh cookies for a freshly issued pair
pub fn token_cookies(config: &CookieConfig, pair: &TokenPair) -> [Cookie<'static>; 2] {
    [
        session_cookie(
            config,
            &config.access_cookie_name,
            pair.access_token.clone(),
            pair.access_expires_in,
        ),
        session_cookie(
            config,
            &config.refresh_cookie_name,
            pair.refresh_token.clone(),
            pair.refresh_expires_in,
        ),
    ]
}

/// Cookies that clear both tokens in the browser
pub fn cleared_cookies(config: &CookieConfig) -> [Cookie<'static>; 2] {
    [&config.access_cookie_name, &config.refresh_cookie_name].map(|name| {
        let mut cookie = session_cookie(config, name, String::new(), 0);
        cookie.make_removal();
        cookie
    })
}

/// Attach the removal cookies to an error response
pub fn clear_session<B>(response: &mut HttpResponse<B>, config: &CookieConfig) {
    for cookie in cleared_cookies(config) {
        if let Err(e) = response.add_cookie(&cookie) {
            tracing::warn!(cookie = cookie.name(), error = %e, "Could not clear cookie");
        }
    }
}

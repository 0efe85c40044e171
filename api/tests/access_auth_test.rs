//! Access token middleware: header/cookie precedence, role guard, self lookup

mod common;

use actix_web::{cookie::Cookie, http::header, http::StatusCode, test};
use auth_api::create_app;
use auth_core::domain::entities::user::Role;
use auth_core::repositories::RefreshTokenRepository;
use serde_json::Value;

use common::TestContext;

#[actix_web::test]
async fn test_self_with_bearer_header() {
    let ctx = TestContext::new();
    let user = ctx.user("a@b.com", Role::Customer).await;
    let pair = ctx.login(&user).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/self")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", pair.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], user.id);
    assert_eq!(body["data"]["email"], "a@b.com");
    assert_eq!(body["data"]["role"], "customer");
}

#[actix_web::test]
async fn test_self_with_cookie_only() {
    let ctx = TestContext::new();
    let user = ctx.user("cookie@b.com", Role::Manager).await;
    let pair = ctx.login(&user).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/self")
        .cookie(Cookie::new("accessToken", pair.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_valid_header_wins_over_expired_cookie() {
    let ctx = TestContext::new();
    let user = ctx.user("a@b.com", Role::Customer).await;
    let pair = ctx.login(&user).await;
    let expired = ctx.expired_access_token(&user);
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/self")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", pair.access_token)))
        .cookie(Cookie::new("accessToken", expired))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_expired_header_is_not_rescued_by_cookie() {
    let ctx = TestContext::new();
    let user = ctx.user("a@b.com", Role::Customer).await;
    let pair = ctx.login(&user).await;
    let expired = ctx.expired_access_token(&user);
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/self")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", expired)))
        .cookie(Cookie::new("accessToken", pair.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "TOKEN_EXPIRED");
}

#[actix_web::test]
async fn test_undefined_header_falls_back_to_cookie() {
    let ctx = TestContext::new();
    let user = ctx.user("a@b.com", Role::Customer).await;
    let pair = ctx.login(&user).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/self")
        .insert_header((header::AUTHORIZATION, "Bearer undefined"))
        .cookie(Cookie::new("accessToken", pair.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_missing_token_is_rejected() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/v1/auth/self").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "TOKEN_MISSING");
}

#[actix_web::test]
async fn test_garbage_and_refresh_tokens_are_malformed() {
    let ctx = TestContext::new();
    let user = ctx.user("a@b.com", Role::Customer).await;
    let pair = ctx.login(&user).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    for token in ["not.a.jwt".to_string(), pair.refresh_token.clone()] {
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/self")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "TOKEN_INVALID");
    }
}

#[actix_web::test]
async fn test_role_guard_rejects_non_admin() {
    let ctx = TestContext::new();
    let manager = ctx.user("m@b.com", Role::Manager).await;
    let customer = ctx.user("c@b.com", Role::Customer).await;
    let pair = ctx.login(&manager).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/auth/users/{}/deactivate", customer.id))
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", pair.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "FORBIDDEN");
}

#[actix_web::test]
async fn test_role_guard_requires_authentication() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/users/1/deactivate")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_admin_deactivation_revokes_sessions() {
    let ctx = TestContext::new();
    let admin = ctx.user("admin@b.com", Role::Admin).await;
    let customer = ctx.user("c@b.com", Role::Customer).await;
    let admin_pair = ctx.login(&admin).await;
    let customer_pair = ctx.login(&customer).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/auth/users/{}/deactivate", customer.id))
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", admin_pair.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["sessions_revoked"], 1);
    assert!(ctx.tokens.ids_for_owner(customer.id).await.is_empty());
    assert_eq!(ctx.tokens.ids_for_owner(admin.id).await.len(), 1);

    // The customer's refresh token is dead
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .cookie(Cookie::new("refreshToken", customer_pair.refresh_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_deactivating_unknown_user() {
    let ctx = TestContext::new();
    let admin = ctx.user("admin@b.com", Role::Admin).await;
    let pair = ctx.login(&admin).await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/users/999/deactivate")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", pair.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "USER_NOT_FOUND");
    assert!(ctx.tokens.exists(1, admin.id).await.unwrap());
}

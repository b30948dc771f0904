use actix_web::{web, HttpResponse, ResponseError};

use crate::config::AuthSettings;
use crate::database::FeedbackStore;
use crate::middleware::auth::Claims;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};
use crate::services::auth_service;

#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful, token cookie set", body = AuthResponse),
        (status = 400, description = "Missing fields, username or email already taken")
    )
)]
pub async fn register(
    db: web::Data<dyn FeedbackStore>,
    settings: web::Data<AuthSettings>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    let username = request.username.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /api/register - username: {}", username);

    match auth_service::register(db.get_ref(), &settings, &request).await {
        Ok(response) => {
            let cookie = auth_service::session_cookie(response.access_token.clone(), &settings);
            HttpResponse::Created().cookie(cookie).json(response)
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", username, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, token cookie set", body = AuthResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    db: web::Data<dyn FeedbackStore>,
    settings: web::Data<AuthSettings>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    let email = request.email.as_deref().unwrap_or("N/A");
    log::info!("🔐 POST /api/login - email: {}", email);

    match auth_service::login(db.get_ref(), &settings, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", email);
            let cookie = auth_service::session_cookie(response.access_token.clone(), &settings);
            HttpResponse::Ok().cookie(cookie).json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Token cookie cleared")
    )
)]
pub async fn logout(settings: web::Data<AuthSettings>) -> HttpResponse {
    log::info!("👋 POST /api/logout");

    HttpResponse::Ok()
        .cookie(auth_service::removal_cookie(&settings))
        .json(serde_json::json!({
            "success": true,
            "message": "Logged out"
        }))
}

#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Authenticated user", body = UserInfo),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User no longer exists")
    ),
    security(
        ("access_token" = [])
    )
)]
pub async fn get_me(db: web::Data<dyn FeedbackStore>, user: web::ReqData<Claims>) -> HttpResponse {
    log::info!("👤 GET /api/me - user {}", user.sub);

    match auth_service::get_current_user(db.get_ref(), &user).await {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(e) => {
            log::warn!("❌ Failed to load user {}: {}", user.sub, e);
            e.error_response()
        }
    }
}

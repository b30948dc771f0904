use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthSettings;
use crate::database::{FeedbackStore, StoreError};
use crate::models::{AuthResponse, LoginRequest, NewUser, RegisterRequest, User, UserInfo};
use crate::utils::error::AppError;
use crate::utils::validation::Required;

pub const TOKEN_COOKIE: &str = "access_token";
pub const TOKEN_COOKIE_PATH: &str = "/api";

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String, // user id
    pub username: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub iss: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }

    /// Claims as the auth middleware would attach them for `user_id`
    #[cfg(test)]
    pub(crate) fn for_user(user_id: i64) -> Self {
        Self {
            sub: user_id.to_string(),
            username: format!("user{}", user_id),
            email: format!("user{}@example.com", user_id),
            iat: 0,
            exp: 0,
            jti: String::new(),
            iss: "feedback-service".to_string(),
        }
    }
}

pub fn generate_jwt(user: &User, settings: &AuthSettings) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        email: user.email.clone(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(settings.token_ttl_hours)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
        iss: settings.jwt_issuer.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

pub fn verify_token(token: &str, settings: &AuthSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[settings.jwt_issuer.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Cookie carrying the token on every `/api` request
pub fn session_cookie(token: String, settings: &AuthSettings) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path(TOKEN_COOKIE_PATH)
        .http_only(true)
        .secure(settings.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::hours(settings.token_ttl_hours))
        .finish()
}

/// Expired cookie that makes the browser drop the token
pub fn removal_cookie(settings: &AuthSettings) -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "")
        .path(TOKEN_COOKIE_PATH)
        .http_only(true)
        .secure(settings.cookie_secure)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}

async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Hashing error: {}", e)))
}

async fn verify_password(password: String, stored_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))
}

fn issue_session(user: &User, settings: &AuthSettings) -> Result<AuthResponse, AppError> {
    Ok(AuthResponse {
        success: true,
        access_token: generate_jwt(user, settings)?,
        user: UserInfo::from(user),
    })
}

// User registration
pub async fn register(
    db: &dyn FeedbackStore,
    settings: &AuthSettings,
    request: &RegisterRequest,
) -> Result<AuthResponse, AppError> {
    let mut required = Required::new();
    let username = required.text("username", &request.username);
    let email = required.text("email", &request.email);
    let password = required.secret("password", &request.password);
    required.finish()?;

    if db.find_user_by_username(&username).await?.is_some() {
        return Err(AppError::InvalidRequest("Username already exists".to_string()));
    }
    if db.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::InvalidRequest("Email already exists".to_string()));
    }

    let password_hash = hash_password(password, settings.bcrypt_cost).await?;

    let user = db
        .insert_user(NewUser {
            username,
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            // Lost a race against a concurrent registration
            StoreError::Duplicate(field) if field == "username" => {
                AppError::InvalidRequest("Username already exists".to_string())
            }
            StoreError::Duplicate(field) if field == "email" => {
                AppError::InvalidRequest("Email already exists".to_string())
            }
            other => other.into(),
        })?;

    log::info!("✅ User registered: {} (id {})", user.username, user.id);

    issue_session(&user, settings)
}

// User login
pub async fn login(
    db: &dyn FeedbackStore,
    settings: &AuthSettings,
    request: &LoginRequest,
) -> Result<AuthResponse, AppError> {
    let mut required = Required::new();
    let email = required.text("email", &request.email);
    let password = required.secret("password", &request.password);
    required.finish()?;

    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let user = db.find_user_by_email(&email).await?.ok_or_else(invalid)?;

    if !verify_password(password, user.password.clone()).await? {
        return Err(invalid());
    }

    issue_session(&user, settings)
}

pub async fn get_current_user(db: &dyn FeedbackStore, claims: &Claims) -> Result<UserInfo, AppError> {
    let user_id = claims.user_id()?;

    db.find_user(user_id)
        .await?
        .map(|user| UserInfo::from(&user))
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

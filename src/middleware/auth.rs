use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::config::AuthSettings;
use crate::services::auth_service::{self, TOKEN_COOKIE};
use crate::utils::error::AppError;

pub use crate::services::auth_service::Claims;

/// Routes under `/api` reachable without a token
const PUBLIC_PATHS: [&str; 3] = ["/api/register", "/api/login", "/api/logout"];

/// Verifies the session token and stores its [`Claims`] in the request extensions.
///
/// The token is read from the `access_token` cookie; when that is missing or
/// rejected, an `Authorization: Bearer` header is tried instead. A trailing `/`
/// is ignored when matching public paths.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

/// Non-empty tokens the request carries, cookie first, then the Bearer header
fn request_tokens(req: &ServiceRequest) -> Vec<String> {
    let cookie = req
        .cookie(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty());

    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    cookie.into_iter().chain(bearer).collect()
}

/// First candidate that verifies wins; otherwise the last failure is reported
fn authenticate(req: &ServiceRequest, settings: &AuthSettings) -> Result<Claims, AppError> {
    let mut failure = AppError::Unauthorized("Missing authorization token".to_string());
    for token in request_tokens(req) {
        match auth_service::verify_token(&token, settings) {
            Ok(claims) => return Ok(claims),
            Err(e) => failure = e,
        }
    }
    Err(failure)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.contains(&req.path().trim_end_matches('/')) {
            let fut = self.service.call(req);
            return Box::pin(async move {
                let res = fut.await?;
                Ok(res)
            });
        }

        let Some(settings) = req.app_data::<web::Data<AuthSettings>>().cloned() else {
            log::error!("❌ AuthSettings missing from app data");
            return Box::pin(async move {
                Err(AppError::Internal("Authentication is not configured".to_string()).into())
            });
        };

        match authenticate(&req, &settings) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(e) => {
                log::warn!("❌ {} {} - {}", req.method(), req.path(), e);
                Box::pin(async move { Err(e.into()) })
            }
        }
    }
}

/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <token>`，把当前用户放进请求扩展。
 * 用户信息按 token 缓存，缓存时长不超过 `cache.default_ttl`，
 * 因此停用账号最迟在一个 TTL 之后生效。
 *
 * ```rust,ignore
 * web::scope("/api/courses")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_courses))
 * ```
 *
 * 处理函数中用 `RequireJWT::extract_user_claims(&req)` 取当前用户。
 */

use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::users::entities::{User, UserStatus};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct RequireJWT;

/// 认证失败原因，区分 401 与 403
enum AuthFailure {
    Unauthorized(&'static str),
    Inactive,
    Internal(&'static str),
}

fn user_cache_key(token: &str) -> String {
    format!("user:{token}")
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

async fn authenticate(req: &ServiceRequest) -> Result<User, AuthFailure> {
    let token = bearer_token(req).ok_or(AuthFailure::Unauthorized(
        "Missing or invalid Authorization header",
    ))?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        AuthFailure::Unauthorized("Invalid or expired token")
    })?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
        .ok_or(AuthFailure::Internal("Cache not configured"))?;

    let key = user_cache_key(token);
    if let Some(user) = cache.get_json::<User>(&key).await {
        return Ok(user);
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or(AuthFailure::Internal("Storage not configured"))?;

    let user_id = claims
        .user_id()
        .ok_or(AuthFailure::Unauthorized("Invalid user ID in token"))?;

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| {
            error!("Failed to load user {} for JWT: {}", user_id, e);
            AuthFailure::Internal("Failed to retrieve user")
        })?
        .ok_or(AuthFailure::Unauthorized("User not found"))?;

    if user.status != UserStatus::Active {
        return Err(AuthFailure::Inactive);
    }

    // 缓存不超过 token 剩余有效期
    let remaining = (claims.exp as i64 - chrono::Utc::now().timestamp()).max(1) as u64;
    let ttl = remaining.min(AppConfig::get().cache.default_ttl.max(1));
    cache.insert_json(key, &user, ttl).await;

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 预检请求直接放行给 CORS 处理
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(HttpResponse::NoContent().finish().map_into_right_body()));
            }

            match authenticate(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(failure) => {
                    let response = match failure {
                        AuthFailure::Unauthorized(msg) => {
                            info!("JWT authentication failed for {}: {}", req.path(), msg);
                            create_error_response(
                                StatusCode::UNAUTHORIZED,
                                ErrorCode::Unauthorized,
                                msg,
                            )
                        }
                        AuthFailure::Inactive => create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::AccountInactive,
                            "Akun tidak aktif",
                        ),
                        AuthFailure::Internal(msg) => {
                            error!("JWT middleware error for {}: {}", req.path(), msg);
                            create_error_response(
                                StatusCode::INTERNAL_SERVER_ERROR,
                                ErrorCode::InternalServerError,
                                msg,
                            )
                        }
                    };
                    Ok(req.into_response(response.map_into_right_body()))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 当前登录用户，须在 RequireJWT 保护的路由中调用
    pub fn extract_user_claims(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    /// 登出或改密后清掉该 token 的用户缓存
    pub async fn forget_token(cache: &dyn ObjectCache, token: &str) {
        cache.remove(&user_cache_key(token)).await;
    }
}

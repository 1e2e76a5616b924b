use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AuthService;
use crate::models::auth::responses::{RefreshTokenResponse, UserInfoResponse};
use crate::models::users::entities::UserStatus;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, server_error};
use crate::utils::jwt::JwtUtils;

pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(refresh_token) = JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Refresh token tidak ditemukan",
        )));
    };

    let (claims, access_token) = match JwtUtils::refresh_access_token(&refresh_token) {
        Ok(result) => result,
        Err(e) => {
            info!("Refresh token rejected: {}", e);
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "Refresh token tidak valid atau kedaluwarsa",
            )));
        }
    };

    // 账号被停用后不再续签
    let storage = service.get_storage(request)?;
    let user_id = claims.user_id().unwrap_or_default();
    match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) if user.status == UserStatus::Active => {}
        Ok(Some(_)) => {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::AccountInactive,
                "Akun tidak aktif",
            )));
        }
        Ok(None) => {
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "User tidak ditemukan",
            )));
        }
        Err(e) => return Ok(server_error("Gagal memperbarui token", e)),
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        RefreshTokenResponse {
            access_token,
            expires_in: JwtUtils::access_expiry().num_seconds(),
        },
        "Token berhasil diperbarui",
    )))
}

pub async fn handle_me(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UserInfoResponse { user },
        "Data user berhasil diambil",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{storage, user};
    use crate::utils::jwt::REFRESH_COOKIE_NAME;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::web;

    #[actix_web::test]
    async fn test_refresh_with_cookie() {
        let raw = storage().await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let storage = shared(raw);
        let pair = student.generate_token_pair(None).unwrap();

        let req = TestRequest::default()
            .app_data(web::Data::new(storage.clone()))
            .cookie(Cookie::new(REFRESH_COOKIE_NAME, pair.refresh_token))
            .to_http_request();
        let resp = handle_refresh_token(&AuthService::new_lazy(), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = request_as(&storage, None);
        let resp = handle_refresh_token(&AuthService::new_lazy(), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_me_requires_user() {
        let raw = storage().await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let storage = shared(raw);

        assert!(handle_me(&request_as(&storage, None)).await.is_err());
        let resp = handle_me(&request_as(&storage, Some(&student))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

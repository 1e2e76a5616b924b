use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::AuthService;
use crate::models::auth::{requests::LoginRequest, responses::LoginResponse};
use crate::models::users::entities::UserStatus;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::server_error;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let identifier = login_request.email.trim();

    // 含 @ 按邮箱查，否则按 NIM/NIP 查
    let lookup = if identifier.contains('@') {
        storage.get_user_by_email(identifier).await
    } else {
        storage.get_user_by_user_id(identifier).await
    };

    let user = match lookup {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!("Login failed, unknown account: {}", identifier);
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::AuthFailed,
                "Email atau password salah",
            )));
        }
        Err(e) => return Ok(server_error("Login gagal", e)),
    };

    if !verify_password(&login_request.password, &user.password_hash) {
        info!("Login failed, wrong password for user {}", user.user_id);
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::AuthFailed,
            "Email atau password salah",
        )));
    }

    if user.status != UserStatus::Active {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::AccountInactive,
            "Akun tidak aktif",
        )));
    }

    if let Err(e) = storage.update_last_login(user.id).await {
        warn!("Failed to update last login for {}: {}", user.id, e);
    }

    let refresh_expiry = JwtUtils::refresh_expiry(login_request.remember_me);
    let tokens = match user.generate_token_pair(Some(refresh_expiry)) {
        Ok(tokens) => tokens,
        Err(e) => return Ok(server_error("Gagal membuat token", e)),
    };

    let cookie =
        JwtUtils::create_refresh_token_cookie(&tokens.refresh_token, tokens.refresh_expires_in);

    info!("User {} ({}) logged in", user.user_id, user.role);

    let response = LoginResponse {
        access_token: tokens.access_token,
        expires_in: tokens.expires_in,
        user,
        created_at: chrono::Utc::now(),
    };

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(response, "Login berhasil")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::requests::CreateUserRequest;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::storage;
    use crate::utils::password::hash_password;
    use actix_web::http::StatusCode;

    async fn setup(status: UserStatus) -> (AuthService, HttpRequest) {
        let storage = shared(storage().await);
        storage
            .create_user(CreateUserRequest {
                user_id: "198703152015041001".to_string(),
                email: "dosen@polimdo.ac.id".to_string(),
                password: hash_password("rahasia2025").unwrap(),
                full_name: "Dosen Satu".to_string(),
                role: UserRole::Lecturer,
                status: Some(status),
                phone: None,
                program_study: None,
                semester: None,
                department: Some("Teknik Elektro".to_string()),
            })
            .await
            .unwrap();
        (AuthService::new_lazy(), request_as(&storage, None))
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            remember_me: false,
        }
    }

    #[actix_web::test]
    async fn test_login_by_email_and_nip() {
        let (service, req) = setup(UserStatus::Active).await;

        let resp = handle_login(&service, login("Dosen@Polimdo.ac.id", "rahasia2025"), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.cookies().any(|c| c.name() == crate::utils::jwt::REFRESH_COOKIE_NAME));
        let body = body_json(resp).await;
        assert_eq!(body["data"]["user"]["role"], "lecturer");
        assert!(body["data"]["access_token"].as_str().is_some());

        let resp = handle_login(&service, login("198703152015041001", "rahasia2025"), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_login_rejects_wrong_password() {
        let (service, req) = setup(UserStatus::Active).await;
        let resp = handle_login(&service, login("dosen@polimdo.ac.id", "salah123"), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::AuthFailed as i32);
    }

    #[actix_web::test]
    async fn test_login_rejects_inactive_account() {
        let (service, req) = setup(UserStatus::Suspended).await;
        let resp = handle_login(&service, login("dosen@polimdo.ac.id", "rahasia2025"), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}

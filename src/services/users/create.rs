use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{UserService, check_identity_available};
use crate::models::{
    ApiResponse, ErrorCode,
    users::{entities::UserStatus, requests::CreateUserRequest, responses::UserResponse},
};
use crate::services::server_error;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_simple, validate_user_id};

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    user_data.user_id = user_data.user_id.trim().to_string();
    user_data.email = user_data.email.trim().to_lowercase();

    if let Err(msg) = validate_user_id(&user_data.user_id, user_data.role) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    if let Err(msg) = validate_email(&user_data.email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    if let Err(msg) = validate_password_simple(&user_data.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    if user_data.full_name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Nama lengkap wajib diisi",
        )));
    }

    let storage = service.get_storage(request)?;

    if let Err(response) = check_identity_available(
        &storage,
        Some(&user_data.email),
        Some(&user_data.user_id),
        None,
    )
    .await
    {
        return Ok(response);
    }

    user_data.password = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(server_error("Gagal memproses kata sandi", e)),
    };
    user_data.status = Some(user_data.status.unwrap_or(UserStatus::Active));

    match storage.create_user(user_data).await {
        Ok(user) => {
            info!("Admin created {} account {}", user.role, user.user_id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(UserResponse { user }, "User berhasil dibuat")))
        }
        Err(e) => {
            tracing::error!("User creation failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::UserCreationFailed,
                format!("Gagal membuat user: {e}"),
            )))
        }
    }
}

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{UserService, check_identity_available};
use crate::middlewares::RequireJWT;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::UpdateUserRequest;
use crate::models::users::responses::UserResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::server_error;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_simple, validate_user_id};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let existing = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "User tidak ditemukan",
            )));
        }
        Err(e) => return Ok(server_error("Gagal mengambil data user", e)),
    };

    // 管理员不能把自己降级
    if RequireJWT::extract_user_id(request) == Some(user_id)
        && update_data.role.is_some_and(|role| role != UserRole::Admin)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserUpdateFailed,
            "Tidak dapat mengubah peran sendiri",
        )));
    }

    if let Some(email) = update_data.email.as_mut() {
        *email = email.trim().to_lowercase();
        if let Err(msg) = validate_email(email) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
        }
    }

    if let Some(new_user_id) = update_data.user_id.as_mut() {
        *new_user_id = new_user_id.trim().to_string();
        let role = update_data.role.unwrap_or(existing.role);
        if let Err(msg) = validate_user_id(new_user_id, role) {
            return Ok(
                HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
            );
        }
    }

    // 只有值发生变化时才检查唯一性
    let email_changed = update_data
        .email
        .as_deref()
        .filter(|email| *email != existing.email);
    let user_id_changed = update_data
        .user_id
        .as_deref()
        .filter(|id| *id != existing.user_id);
    if let Err(response) =
        check_identity_available(&storage, email_changed, user_id_changed, Some(user_id)).await
    {
        return Ok(response);
    }

    if let Some(password) = update_data.password.take() {
        if let Err(msg) = validate_password_simple(&password) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
        }
        update_data.password = match hash_password(&password) {
            Ok(hash) => Some(hash),
            Err(e) => return Ok(server_error("Gagal memproses kata sandi", e)),
        };
    }

    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserResponse { user },
            "User berhasil diperbarui",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User tidak ditemukan",
        ))),
        Err(e) => {
            tracing::error!("User update failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::UserUpdateFailed,
                format!("Gagal memperbarui user: {e}"),
            )))
        }
    }
}

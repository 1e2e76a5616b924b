use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::UserStatus;
use crate::models::users::requests::BulkUpdateStatusRequest;
use crate::models::users::responses::{BulkUpdateStatusResponse, UserResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::server_error;

pub async fn update_user_status(
    service: &UserService,
    user_id: i64,
    status: UserStatus,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    // 管理员不能停用自己
    if RequireJWT::extract_user_id(request) == Some(user_id) && status != UserStatus::Active {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotSuspendCurrentUser,
            "Tidak dapat menangguhkan akun sendiri",
        )));
    }

    let storage = service.get_storage(request)?;

    match storage.bulk_update_user_status(&[user_id], status).await {
        Ok(0) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "User tidak ditemukan",
            )));
        }
        Ok(_) => {}
        Err(e) => return Ok(server_error("Gagal memperbarui status user", e)),
    }

    match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => {
            tracing::info!("User {} status set to {}", user.user_id, status);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user },
                "Status user berhasil diperbarui",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User tidak ditemukan",
        ))),
        Err(e) => Ok(server_error("Gagal mengambil data user", e)),
    }
}

/// 去掉当前管理员自己的 ID 并去重
pub(crate) fn bulk_targets(ids: &[i64], current_user_id: Option<i64>) -> (Vec<i64>, bool) {
    let mut targets: Vec<i64> = ids
        .iter()
        .copied()
        .filter(|id| Some(*id) != current_user_id)
        .collect();
    targets.sort_unstable();
    targets.dedup();
    let skipped_self = current_user_id.is_some_and(|me| ids.contains(&me));
    (targets, skipped_self)
}

pub async fn bulk_update_status(
    service: &UserService,
    bulk: BulkUpdateStatusRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if bulk.user_ids.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "user_ids must not be empty",
        )));
    }

    let (targets, skipped_self) = bulk_targets(&bulk.user_ids, RequireJWT::extract_user_id(request));
    let storage = service.get_storage(request)?;

    let updated = if targets.is_empty() {
        0
    } else {
        match storage.bulk_update_user_status(&targets, bulk.status).await {
            Ok(count) => count,
            Err(e) => return Ok(server_error("Gagal memperbarui status user", e)),
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        BulkUpdateStatusResponse {
            updated,
            skipped_self,
        },
        format!("{updated} user(s) updated"),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{storage, user};
    use actix_web::http::StatusCode;

    #[test]
    fn test_bulk_targets_skip_self() {
        let (targets, skipped) = bulk_targets(&[3, 1, 3, 2], Some(1));
        assert_eq!(targets, vec![2, 3]);
        assert!(skipped);

        let (targets, skipped) = bulk_targets(&[4], Some(1));
        assert_eq!(targets, vec![4]);
        assert!(!skipped);
    }

    #[actix_web::test]
    async fn test_admin_cannot_suspend_self() {
        let raw = storage().await;
        let admin = user(&raw, "ADMIN001", UserRole::Admin).await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let storage = shared(raw);
        let req = request_as(&storage, Some(&admin));
        let service = UserService::new_lazy();

        let resp = update_user_status(&service, admin.id, UserStatus::Suspended, &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = update_user_status(&service, student.id, UserStatus::Suspended, &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["user"]["status"], "suspended");

        let resp = update_user_status(&service, 999, UserStatus::Active, &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_bulk_update_excludes_self() {
        let raw = storage().await;
        let admin = user(&raw, "ADMIN001", UserRole::Admin).await;
        let a = user(&raw, "220211060001", UserRole::Student).await;
        let b = user(&raw, "220211060002", UserRole::Student).await;
        let storage = shared(raw);
        let req = request_as(&storage, Some(&admin));

        let resp = bulk_update_status(
            &UserService::new_lazy(),
            BulkUpdateStatusRequest {
                user_ids: vec![admin.id, a.id, b.id],
                status: UserStatus::Inactive,
            },
            &req,
        )
        .await
        .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["data"]["updated"], 2);
        assert_eq!(body["data"]["skipped_self"], true);

        let admin = storage.get_user_by_id(admin.id).await.unwrap().unwrap();
        assert_eq!(admin.status, UserStatus::Active);
    }
}

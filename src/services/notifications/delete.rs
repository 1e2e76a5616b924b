use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{NotificationService, load_own_notification};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, server_error};

pub async fn delete_notification(
    service: &NotificationService,
    notification_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_own_notification(&storage, notification_id, user.id).await {
        return Ok(resp);
    }

    match storage.delete_notification(notification_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Notifikasi berhasil dihapus",
        ))),
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotificationNotFound,
            "Notifikasi tidak ditemukan",
        ))),
        Err(e) => Ok(server_error("Gagal menghapus notifikasi", e)),
    }
}

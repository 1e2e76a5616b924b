use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{NotificationService, load_own_notification};
use crate::models::ApiResponse;
use crate::models::notifications::responses::MarkAllReadResponse;
use crate::services::{current_user, server_error};

pub async fn mark_as_read(
    service: &NotificationService,
    notification_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_own_notification(&storage, notification_id, user.id).await {
        return Ok(resp);
    }

    // 已读的再次标记视为成功
    match storage.mark_notification_as_read(notification_id).await {
        Ok(_) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Notifikasi berhasil ditandai sebagai dibaca",
        ))),
        Err(e) => Ok(server_error(
            "Gagal menandai notifikasi sebagai dibaca",
            e,
        )),
    }
}

pub async fn mark_all_as_read(
    service: &NotificationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    match storage.mark_all_notifications_as_read(user.id).await {
        Ok(marked_count) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MarkAllReadResponse { marked_count },
            "Semua notifikasi berhasil ditandai sebagai dibaca",
        ))),
        Err(e) => Ok(server_error(
            "Gagal menandai semua notifikasi sebagai dibaca",
            e,
        )),
    }
}

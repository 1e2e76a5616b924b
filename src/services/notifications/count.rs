use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::NotificationService;
use crate::models::ApiResponse;
use crate::models::notifications::responses::UnreadCountResponse;
use crate::services::{current_user, server_error};

pub async fn get_unread_count(
    service: &NotificationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    match storage.get_unread_notification_count(user.id).await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UnreadCountResponse {
                unread_count: count,
            },
            "Jumlah notifikasi belum dibaca berhasil diambil",
        ))),
        Err(e) => Ok(server_error(
            "Gagal mengambil jumlah notifikasi yang belum dibaca",
            e,
        )),
    }
}

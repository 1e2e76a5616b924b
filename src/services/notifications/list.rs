use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::NotificationService;
use crate::models::ApiResponse;
use crate::models::notifications::requests::NotificationListQuery;
use crate::services::{current_user, server_error};

pub async fn list_notifications(
    service: &NotificationService,
    query: NotificationListQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    match storage
        .list_notifications_with_pagination(user.id, query)
        .await
    {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            list,
            "Notifikasi berhasil diambil",
        ))),
        Err(e) => Ok(server_error("Gagal mengambil notifikasi", e)),
    }
}

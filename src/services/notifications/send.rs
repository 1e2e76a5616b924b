use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::NotificationService;
use crate::models::notifications::entities::NotificationType;
use crate::models::notifications::requests::{
    BroadcastNotificationRequest, CreateNotificationRequest, SendNotificationRequest,
};
use crate::models::notifications::responses::{BroadcastResponse, NotificationResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, server_error};

fn missing_content() -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        "Judul dan pesan harus diisi",
    ))
}

pub async fn send_notification(
    service: &NotificationService,
    body: SendNotificationRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let sender = current_user(request)?;

    let title = body.title.trim().to_string();
    let message = body.message.trim().to_string();
    if title.is_empty() || message.is_empty() {
        return Ok(missing_content());
    }

    let storage = service.get_storage(request)?;

    match storage.get_user_by_id(body.user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "User tidak ditemukan",
            )));
        }
        Err(e) => return Ok(server_error("Gagal mengirim notifikasi", e)),
    }

    let notification = CreateNotificationRequest {
        user_id: body.user_id,
        notification_type: body.notification_type.unwrap_or(NotificationType::System),
        title,
        message,
        created_by: Some(sender.id),
    };

    match storage.create_notification(notification).await {
        Ok(notification) => Ok(HttpResponse::Created().json(ApiResponse::success(
            NotificationResponse { notification },
            "Notifikasi berhasil dikirim",
        ))),
        Err(e) => Ok(server_error("Gagal mengirim notifikasi", e)),
    }
}

pub async fn broadcast_notification(
    service: &NotificationService,
    body: BroadcastNotificationRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let sender = current_user(request)?;

    let title = body.title.trim();
    let message = body.message.trim();
    if title.is_empty() || message.is_empty() {
        return Ok(missing_content());
    }

    let storage = service.get_storage(request)?;

    let recipients = match storage.list_active_user_ids(body.role).await {
        Ok(ids) => ids,
        Err(e) => return Ok(server_error("Gagal broadcast notifikasi", e)),
    };

    let sent = match storage
        .create_notifications_for_users(
            &recipients,
            body.notification_type
                .unwrap_or(NotificationType::Announcement),
            title,
            message,
            Some(sender.id),
        )
        .await
    {
        Ok(sent) => sent,
        Err(e) => return Ok(server_error("Gagal broadcast notifikasi", e)),
    };

    info!(
        "Broadcast '{}' sent to {} users by {}",
        title, sent, sender.user_id
    );
    Ok(HttpResponse::Created().json(ApiResponse::success(
        BroadcastResponse { recipients: sent },
        format!("Notifikasi berhasil dikirim ke {sent} user"),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaginationQuery;
    use crate::models::notifications::requests::NotificationListQuery;
    use crate::models::users::entities::UserRole;
    use crate::services::notifications::{count, delete, list, read};
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{storage, user};
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_send_read_and_delete() {
        let raw = storage().await;
        let lecturer = user(&raw, "198703152015041001", UserRole::Lecturer).await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let other = user(&raw, "220211060002", UserRole::Student).await;
        let storage = shared(raw);
        let service = NotificationService::new_lazy();

        let resp = send_notification(
            &service,
            SendNotificationRequest {
                user_id: student.id,
                notification_type: None,
                title: "Kuis".to_string(),
                message: "Kuis minggu depan".to_string(),
            },
            &request_as(&storage, Some(&lecturer)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let id = body_json(resp).await["data"]["notification"]["id"]
            .as_i64()
            .unwrap();

        let student_req = request_as(&storage, Some(&student));
        let resp = count::get_unread_count(&service, &student_req).await.unwrap();
        assert_eq!(body_json(resp).await["data"]["unread_count"], 1);

        // 别人的通知不可见
        let other_req = request_as(&storage, Some(&other));
        let resp = read::mark_as_read(&service, id, &other_req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = delete::delete_notification(&service, id, &other_req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = read::mark_as_read(&service, id, &student_req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = list::list_notifications(
            &service,
            NotificationListQuery {
                pagination: PaginationQuery::default(),
                unread_only: Some(true),
            },
            &student_req,
        )
        .await
        .unwrap();
        assert_eq!(body_json(resp).await["data"]["pagination"]["total"], 0);

        let resp = delete::delete_notification(&service, id, &student_req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_broadcast_to_role() {
        let raw = storage().await;
        let admin = user(&raw, "ADMIN001", UserRole::Admin).await;
        let a = user(&raw, "220211060001", UserRole::Student).await;
        user(&raw, "220211060002", UserRole::Student).await;
        user(&raw, "198703152015041001", UserRole::Lecturer).await;
        let storage = shared(raw);
        let service = NotificationService::new_lazy();

        let resp = broadcast_notification(
            &service,
            BroadcastNotificationRequest {
                role: Some(UserRole::Student),
                notification_type: None,
                title: "Libur".to_string(),
                message: "Kampus libur besok".to_string(),
            },
            &request_as(&storage, Some(&admin)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_json(resp).await["data"]["recipients"], 2);

        let resp = read::mark_all_as_read(&service, &request_as(&storage, Some(&a)))
            .await
            .unwrap();
        assert_eq!(body_json(resp).await["data"]["marked_count"], 1);

        let resp = broadcast_notification(
            &service,
            BroadcastNotificationRequest {
                role: None,
                notification_type: None,
                title: " ".to_string(),
                message: "x".to_string(),
            },
            &request_as(&storage, Some(&admin)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

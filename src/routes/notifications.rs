use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::notifications::requests::{
    BroadcastNotificationRequest, NotificationListQuery, SendNotificationRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::NotificationService;
use crate::utils::SafeIDI64;

static NOTIFICATION_SERVICE: Lazy<NotificationService> = Lazy::new(NotificationService::new_lazy);

pub async fn list_notifications(
    req: HttpRequest,
    query: web::Query<NotificationListQuery>,
) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE.list(query.into_inner(), &req).await
}

pub async fn unread_count(req: HttpRequest) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE.unread_count(&req).await
}

pub async fn mark_read(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE.mark_read(id.0, &req).await
}

pub async fn mark_all_read(req: HttpRequest) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE.mark_all_read(&req).await
}

pub async fn delete_notification(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE.delete(id.0, &req).await
}

pub async fn send_notification(
    req: HttpRequest,
    body: web::Json<SendNotificationRequest>,
) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE.send(body.into_inner(), &req).await
}

pub async fn broadcast_notification(
    req: HttpRequest,
    body: web::Json<BroadcastNotificationRequest>,
) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE.broadcast(body.into_inner(), &req).await
}

pub fn configure_notification_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notifications")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_notifications))
            .route("/unread-count", web::get().to(unread_count))
            .route("/read-all", web::patch().to(mark_all_read))
            .service(
                web::resource("/send")
                    .route(web::post().to(send_notification))
                    .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles())),
            )
            .service(
                web::resource("/broadcast")
                    .route(web::post().to(broadcast_notification))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            .route("/{id}/read", web::patch().to(mark_read))
            .route("/{id}", web::delete().to(delete_notification)),
    );
}

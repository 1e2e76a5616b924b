use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::room_access::requests::RoomAccessListParams;
use crate::models::users::entities::UserRole;
use crate::services::RoomAccessService;
use crate::utils::SafeIDI64;

static ROOM_ACCESS_SERVICE: Lazy<RoomAccessService> = Lazy::new(RoomAccessService::new_lazy);

pub async fn list_classes(
    req: HttpRequest,
    query: web::Query<RoomAccessListParams>,
) -> ActixResult<HttpResponse> {
    ROOM_ACCESS_SERVICE
        .list_classes(query.into_inner(), &req)
        .await
}

pub async fn door_status(req: HttpRequest) -> ActixResult<HttpResponse> {
    ROOM_ACCESS_SERVICE.door_status(&req).await
}

pub async fn class_detail(req: HttpRequest, class_id: SafeIDI64) -> ActixResult<HttpResponse> {
    ROOM_ACCESS_SERVICE.class_detail(class_id.0, &req).await
}

pub async fn revoke(req: HttpRequest, class_id: SafeIDI64) -> ActixResult<HttpResponse> {
    ROOM_ACCESS_SERVICE.revoke(class_id.0, &req).await
}

pub async fn grant(req: HttpRequest, class_id: SafeIDI64) -> ActixResult<HttpResponse> {
    ROOM_ACCESS_SERVICE.grant(class_id.0, &req).await
}

pub fn configure_room_access_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/room-access")
            .wrap(middlewares::RequireJWT)
            .route("/classes", web::get().to(list_classes))
            .route("/door/status", web::get().to(door_status))
            .route("/classes/{id}/detail", web::get().to(class_detail))
            .service(
                web::resource("/classes/{id}/revoke")
                    .route(web::patch().to(revoke))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            .service(
                web::resource("/classes/{id}/grant")
                    .route(web::patch().to(grant))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            ),
    );
}

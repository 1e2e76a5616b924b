use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::room_access::requests::DoorAccessLogQuery;
use crate::models::system::requests::{SettingsQuery, UpdateSettingRequest};
use crate::models::users::entities::UserRole;
use crate::services::SystemService;
use crate::utils::SafeSettingKey;

// 懒加载的全局 SystemService 实例
static SYSTEM_SERVICE: Lazy<SystemService> = Lazy::new(SystemService::new_lazy);

pub async fn get_settings(
    request: HttpRequest,
    query: web::Query<SettingsQuery>,
) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE
        .get_settings(query.into_inner(), &request)
        .await
}

pub async fn get_public_settings(request: HttpRequest) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE.get_public_settings(&request).await
}

pub async fn update_setting(
    request: HttpRequest,
    key: SafeSettingKey,
    body: web::Json<UpdateSettingRequest>,
) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE
        .update_setting(key, body.into_inner(), &request)
        .await
}

pub async fn door_access_logs(
    request: HttpRequest,
    query: web::Query<DoorAccessLogQuery>,
) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE
        .door_access_logs(query.into_inner(), &request)
        .await
}

// 配置路由
pub fn configure_system_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/system")
            .wrap(middleware::Compress::default())
            .wrap(middlewares::RequireJWT)
            .route("/settings/public", web::get().to(get_public_settings))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/settings", web::get().to(get_settings))
                    .route("/settings/{category}/{key}", web::put().to(update_setting))
                    .route("/door-access-logs", web::get().to(door_access_logs)),
            ),
    );
}

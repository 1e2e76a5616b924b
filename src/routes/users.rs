use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::{
    BulkUpdateStatusRequest, CreateUserRequest, UpdateUserRequest, UpdateUserStatusRequest,
    UserListParams,
};
use crate::services::UserService;
use crate::utils::SafeIDI64;

// 懒加载的全局 UserService 实例
static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

pub async fn dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    USER_SERVICE.dashboard(&req).await
}

pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_users(query.into_inner(), &req).await
}

pub async fn create_user(
    req: HttpRequest,
    user_data: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.create_user(user_data.into_inner(), &req).await
}

pub async fn get_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.get_user(user_id.0, &req).await
}

pub async fn update_user(
    req: HttpRequest,
    user_id: SafeIDI64,
    update_data: web::Json<UpdateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .update_user(user_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.delete_user(user_id.0, &req).await
}

pub async fn update_status(
    req: HttpRequest,
    user_id: SafeIDI64,
    body: web::Json<UpdateUserStatusRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .update_status(user_id.0, body.into_inner().status, &req)
        .await
}

pub async fn bulk_update_status(
    req: HttpRequest,
    body: web::Json<BulkUpdateStatusRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.bulk_update_status(body.into_inner(), &req).await
}

// 配置路由
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/dashboard", web::get().to(dashboard))
                    .route("/users", web::get().to(list_users))
                    .route("/users", web::post().to(create_user))
                    // 必须在 /users/{id} 之前注册
                    .route("/users/status/bulk", web::patch().to(bulk_update_status))
                    .route("/users/{id}", web::get().to(get_user))
                    .route("/users/{id}", web::put().to(update_user))
                    .route("/users/{id}", web::delete().to(delete_user))
                    .route("/users/{id}/status", web::patch().to(update_status)),
            ),
    );
}

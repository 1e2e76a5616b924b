use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::dashboard::requests::CalendarParams;
use crate::models::users::entities::UserRole;
use crate::services::DashboardService;

static DASHBOARD_SERVICE: Lazy<DashboardService> = Lazy::new(DashboardService::new_lazy);

pub async fn super_admin(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.super_admin(&req).await
}

pub async fn lecturer(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.lecturer(&req).await
}

pub async fn student(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.student(&req).await
}

pub async fn calendar(
    req: HttpRequest,
    query: web::Query<CalendarParams>,
) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.calendar(query.into_inner(), &req).await
}

pub fn configure_dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/dashboard")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/super-admin")
                    .route(web::get().to(super_admin))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            )
            .service(
                web::resource("/lecturer")
                    .route(web::get().to(lecturer))
                    .wrap(middlewares::RequireRole::new(UserRole::Lecturer)),
            )
            .service(
                web::resource("/student")
                    .route(web::get().to(student))
                    .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
            )
            // 学生看自己，管理员和教师需带 student_id
            .route("/student/calendar", web::get().to(calendar)),
    );
}

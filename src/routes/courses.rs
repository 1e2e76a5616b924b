use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::courses::requests::{
    CourseListParams, CourseOverviewParams, CreateClassRequest, CreateCourseRequest,
    EnrollRequest, UpdateCourseRequest, UpdateEnrollmentStatusRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::CourseService;
use crate::utils::{SafeClassIdI64, SafeCourseIdI64, SafeIDI64};

static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseListParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(query.into_inner(), &req).await
}

pub async fn create_course(
    req: HttpRequest,
    body: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.create_course(body.into_inner(), &req).await
}

pub async fn update_course(
    req: HttpRequest,
    course_id: SafeIDI64,
    body: web::Json<UpdateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_course(course_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_course(req: HttpRequest, course_id: SafeIDI64) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_course(course_id.0, &req).await
}

pub async fn list_course_classes(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_course_classes(course_id.0, &req).await
}

pub async fn create_class(
    req: HttpRequest,
    body: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.create_class(body.into_inner(), &req).await
}

pub async fn list_class_enrollments(
    req: HttpRequest,
    class_id: SafeClassIdI64,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_class_enrollments(class_id.0, &req).await
}

pub async fn enroll(req: HttpRequest, body: web::Json<EnrollRequest>) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.enroll(body.into_inner(), &req).await
}

pub async fn update_enrollment_status(
    req: HttpRequest,
    enrollment_id: SafeIDI64,
    body: web::Json<UpdateEnrollmentStatusRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_enrollment_status(enrollment_id.0, body.into_inner(), &req)
        .await
}

pub async fn overview(
    req: HttpRequest,
    query: web::Query<CourseOverviewParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.overview(query.into_inner(), &req).await
}

pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/courses")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_courses))
                    .route(
                        web::post()
                            .to(create_course)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/overview")
                    .route(web::get().to(overview))
                    .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles())),
            )
            .service(
                web::resource("/classes").route(
                    web::post()
                        .to(create_class)
                        // 教师只能给自己开班，业务层检查
                        .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles())),
                ),
            )
            // 权限在业务层检查（管理员或任课教师）
            .service(
                web::resource("/classes/{class_id}/enrollments")
                    .route(web::get().to(list_class_enrollments)),
            )
            // 学生只能给自己选课，业务层检查
            .service(web::resource("/enrollments").route(web::post().to(enroll)))
            .service(
                web::resource("/enrollments/{id}/status")
                    .route(web::patch().to(update_enrollment_status))
                    .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles())),
            )
            .service(
                web::resource("/{course_id}/classes").route(web::get().to(list_course_classes)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::put().to(update_course))
                    .route(web::delete().to(delete_course))
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
            ),
    );
}

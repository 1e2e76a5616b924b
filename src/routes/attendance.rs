use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::PaginationQuery;
use crate::models::attendance::requests::{
    AttendanceHistoryParams, CheckAccessRequest, CreateSessionRequest, RecordAttendanceRequest,
    RecordFaceAttendanceRequest, SessionListParams, UpdateAttendanceRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AttendanceService;
use crate::utils::{SafeClassIdI64, SafeIDI64, SafeSessionIdI64};

static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

pub async fn create_session(
    req: HttpRequest,
    body: web::Json<CreateSessionRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.create_session(body.into_inner(), &req).await
}

pub async fn list_class_sessions(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    query: web::Query<SessionListParams>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_class_sessions(class_id.0, query.into_inner(), &req)
        .await
}

pub async fn start_session(req: HttpRequest, session_id: SafeIDI64) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.start_session(session_id.0, &req).await
}

pub async fn end_session(req: HttpRequest, session_id: SafeIDI64) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.end_session(session_id.0, &req).await
}

pub async fn record_attendance(
    req: HttpRequest,
    body: web::Json<RecordAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .record_attendance(body.into_inner(), &req)
        .await
}

pub async fn record_face_attendance(
    req: HttpRequest,
    body: web::Json<RecordFaceAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .record_face_attendance(body.into_inner(), &req)
        .await
}

pub async fn session_records(
    req: HttpRequest,
    session_id: SafeSessionIdI64,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .session_records(session_id.0, query.into_inner(), &req)
        .await
}

pub async fn update_record(
    req: HttpRequest,
    attendance_id: SafeIDI64,
    body: web::Json<UpdateAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .update_record(attendance_id.0, body.into_inner(), &req)
        .await
}

pub async fn class_statistics(
    req: HttpRequest,
    class_id: SafeClassIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.class_statistics(class_id.0, &req).await
}

pub async fn check_access(
    req: HttpRequest,
    body: web::Json<CheckAccessRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.check_access(body.into_inner(), &req).await
}

pub async fn history(
    req: HttpRequest,
    query: web::Query<AttendanceHistoryParams>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.history(query.into_inner(), &req).await
}

pub fn configure_attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/attendance")
            // 门禁设备调用，不需要登录，只做限流
            .service(
                web::resource("/check-access")
                    .wrap(middlewares::RateLimit::door_device())
                    .route(web::post().to(check_access)),
            )
            .service(
                web::scope("")
                    .wrap(middlewares::RequireJWT)
                    .service(
                        web::resource("/sessions")
                            .route(web::post().to(create_session))
                            .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles())),
                    )
                    .service(
                        web::resource("/sessions/class/{class_id}")
                            .route(web::get().to(list_class_sessions)),
                    )
                    .service(
                        web::resource("/sessions/{id}/start")
                            .route(web::patch().to(start_session))
                            .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles())),
                    )
                    .service(
                        web::resource("/sessions/{id}/end")
                            .route(web::patch().to(end_session))
                            .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles())),
                    )
                    .service(
                        web::resource("/record")
                            .route(web::post().to(record_attendance))
                            .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles())),
                    )
                    .service(
                        web::resource("/record/face")
                            .route(web::post().to(record_face_attendance))
                            .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles())),
                    )
                    .service(
                        web::resource("/session/{session_id}")
                            .route(web::get().to(session_records))
                            .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles())),
                    )
                    .service(
                        web::resource("/records/{id}")
                            .route(web::patch().to(update_record))
                            .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles())),
                    )
                    .service(
                        web::resource("/statistics/class/{class_id}")
                            .route(web::get().to(class_statistics))
                            .wrap(middlewares::RequireRole::new_any(UserRole::lecturer_roles())),
                    )
                    .service(
                        web::resource("/history")
                            .route(web::get().to(history))
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
}

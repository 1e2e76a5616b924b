use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::reports::requests::{ReportDateRange, StudentReportParams};
use crate::services::ReportService;
use crate::utils::{SafeClassIdI64, SafeLecturerIdI64, SafeStudentIdI64};

static REPORT_SERVICE: Lazy<ReportService> = Lazy::new(ReportService::new_lazy);

pub async fn class_report(
    req: HttpRequest,
    class_id: SafeClassIdI64,
    query: web::Query<ReportDateRange>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .class_report(class_id.0, query.into_inner(), &req)
        .await
}

pub async fn student_report(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
    query: web::Query<StudentReportParams>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .student_report(student_id.0, query.into_inner(), &req)
        .await
}

pub async fn lecturer_summary(
    req: HttpRequest,
    lecturer_id: SafeLecturerIdI64,
    query: web::Query<ReportDateRange>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .lecturer_summary(lecturer_id.0, query.into_inner(), &req)
        .await
}

// 权限都在业务层检查
pub fn configure_report_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/reports/attendance")
            .wrap(middlewares::RequireJWT)
            .route("/class/{class_id}", web::get().to(class_report))
            .route("/student/{student_id}", web::get().to(student_report))
            .route("/lecturer/{lecturer_id}", web::get().to(lecturer_summary)),
    );
}

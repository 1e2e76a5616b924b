use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, held_sessions, validate_range};
use crate::models::attendance::entities::StudentAttendance;
use crate::models::attendance::responses::StatusCounts;
use crate::models::courses::requests::ClassFilter;
use crate::models::courses::responses::CourseClassDetail;
use crate::models::dashboard::responses::SessionWithClass;
use crate::models::reports::requests::StudentReportParams;
use crate::models::reports::responses::{
    ReportStudentInfo, StudentAttendanceReport, StudentClassReport,
};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::courses::forbidden;
use crate::services::system::DynamicConfig;
use crate::services::{current_user, percentage, server_error};

/// 按班级汇总某个学生的考勤
pub(crate) fn class_reports(
    classes: &[CourseClassDetail],
    sessions: &[SessionWithClass],
    records: &[StudentAttendance],
    student_id: i64,
    minimum_percentage: f64,
) -> Vec<StudentClassReport> {
    classes
        .iter()
        .map(|detail| {
            let session_ids: Vec<i64> = sessions
                .iter()
                .filter(|s| s.session.class_id == detail.class.id)
                .map(|s| s.session.id)
                .collect();
            let mut counts = StatusCounts::default();
            for record in records
                .iter()
                .filter(|r| r.student_id == student_id && session_ids.contains(&r.session_id))
            {
                counts.add(record.status);
            }
            let total_sessions = session_ids.len() as u64;
            let attendance_percentage = percentage(counts.attended(), total_sessions);
            StudentClassReport {
                class_id: detail.class.id,
                class_name: detail.class.class_name.clone(),
                course_code: detail.course_code.clone(),
                course_name: detail.course_name.clone(),
                lecturer_name: detail.class.lecturer_name.clone(),
                total_sessions,
                counts,
                attendance_percentage,
                below_minimum: total_sessions > 0 && attendance_percentage < minimum_percentage,
            }
        })
        .collect()
}

pub async fn student_attendance_report(
    service: &ReportService,
    student_id: i64,
    params: StudentReportParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    if user.role == UserRole::Student && user.id != student_id {
        return Ok(forbidden(
            "Anda hanya dapat mengakses laporan kehadiran sendiri",
        ));
    }
    if let Err(resp) = validate_range(&params.range) {
        return Ok(resp);
    }
    let storage = service.get_storage(request)?;

    let student = match storage.get_user_by_id(student_id).await {
        Ok(Some(student)) if student.role == UserRole::Student => student,
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Mahasiswa tidak ditemukan",
            )));
        }
        Err(e) => return Ok(server_error("Gagal membuat laporan kehadiran mahasiswa", e)),
    };

    let classes = storage
        .list_class_details(ClassFilter {
            student_id: Some(student_id),
            course_id: params.course_id,
            ..Default::default()
        })
        .await;
    let classes = match classes {
        Ok(classes) => classes,
        Err(e) => return Ok(server_error("Gagal membuat laporan kehadiran mahasiswa", e)),
    };

    let class_ids: Vec<i64> = classes.iter().map(|c| c.class.id).collect();
    let sessions = match held_sessions(&storage, class_ids, &params.range).await {
        Ok(sessions) => sessions,
        Err(e) => return Ok(server_error("Gagal membuat laporan kehadiran mahasiswa", e)),
    };
    let session_ids: Vec<i64> = sessions.iter().map(|s| s.session.id).collect();
    let records = match storage.list_attendances_for_sessions(&session_ids).await {
        Ok(records) => records,
        Err(e) => return Ok(server_error("Gagal membuat laporan kehadiran mahasiswa", e)),
    };

    let minimum = DynamicConfig::min_attendance_percentage().await;
    let class_reports = class_reports(&classes, &sessions, &records, student_id, minimum);

    let mut overall = StatusCounts::default();
    let mut total_sessions = 0u64;
    for report in &class_reports {
        overall.present += report.counts.present;
        overall.absent += report.counts.absent;
        overall.late += report.counts.late;
        overall.excused += report.counts.excused;
        overall.sick += report.counts.sick;
        total_sessions += report.total_sessions;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentAttendanceReport {
            student: ReportStudentInfo {
                id: student.id,
                user_id: student.user_id,
                full_name: student.full_name,
                email: student.email,
                program_study: student.program_study,
            },
            date_range: params.range,
            classes: class_reports,
            overall_percentage: percentage(overall.attended(), total_sessions),
            overall,
            generated_at: chrono::Utc::now(),
        },
        "Laporan kehadiran mahasiswa berhasil dibuat",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::{AttendanceMethod, AttendanceStatus, SessionStatus};
    use crate::models::attendance::requests::NewStudentAttendance;
    use crate::models::reports::requests::ReportDateRange;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{
        class_with_schedule, new_session, storage, user,
    };
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_student_report_per_class() {
        let raw = storage().await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let algo = class_with_schedule(&raw, "TI101", None, vec![]).await;
        let db = class_with_schedule(&raw, "TI202", None, vec![]).await;
        raw.create_enrollment_impl(student.id, algo.id).await.unwrap();
        raw.create_enrollment_impl(student.id, db.id).await.unwrap();

        for (class_id, date, status) in [
            (algo.id, "2025-06-02", Some(AttendanceStatus::Present)),
            (algo.id, "2025-06-09", Some(AttendanceStatus::Late)),
            (db.id, "2025-06-03", Some(AttendanceStatus::Present)),
            (db.id, "2025-06-10", None),
        ] {
            let session = raw
                .create_session_impl(new_session(class_id, date, "08:00", "10:00"))
                .await
                .unwrap();
            raw.update_session_status_impl(session.id, SessionStatus::Completed)
                .await
                .unwrap();
            if let Some(status) = status {
                raw.create_attendance_impl(NewStudentAttendance {
                    session_id: session.id,
                    student_id: student.id,
                    status,
                    check_in_time: None,
                    attendance_method: AttendanceMethod::Manual,
                    confidence_score: None,
                    notes: None,
                })
                .await
                .unwrap();
            }
        }

        let storage = shared(raw);
        let resp = student_attendance_report(
            &ReportService::new_lazy(),
            student.id,
            StudentReportParams {
                range: ReportDateRange::default(),
                course_id: None,
            },
            &request_as(&storage, Some(&student)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        let classes = body["data"]["classes"].as_array().unwrap();
        assert_eq!(classes.len(), 2);
        let algo_row = classes.iter().find(|c| c["class_id"] == algo.id).unwrap();
        assert_eq!(algo_row["attendance_percentage"], 100.0);
        let db_row = classes.iter().find(|c| c["class_id"] == db.id).unwrap();
        assert_eq!(db_row["attendance_percentage"], 50.0);
        assert_eq!(db_row["below_minimum"], true);
        assert_eq!(body["data"]["overall_percentage"], 75.0);
    }

    #[actix_web::test]
    async fn test_student_cannot_read_others() {
        let raw = storage().await;
        let me = user(&raw, "220211060001", UserRole::Student).await;
        let other = user(&raw, "220211060002", UserRole::Student).await;
        let storage = shared(raw);

        let resp = student_attendance_report(
            &ReportService::new_lazy(),
            other.id,
            StudentReportParams {
                range: ReportDateRange::default(),
                course_id: None,
            },
            &request_as(&storage, Some(&me)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}

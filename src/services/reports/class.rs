use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, held_sessions, validate_range};
use crate::models::attendance::entities::{AttendanceStatus, StudentAttendance};
use crate::models::attendance::responses::StatusCounts;
use crate::models::courses::entities::{CourseClass, EnrollmentStatus};
use crate::models::courses::responses::EnrollmentDetail;
use crate::models::dashboard::responses::SessionWithClass;
use crate::models::reports::requests::ReportDateRange;
use crate::models::reports::responses::{
    ClassAttendanceReport, ClassReportStatistics, MatrixCell, ReportClassInfo, ReportSession,
    StudentMatrixRow,
};
use crate::models::ApiResponse;
use crate::services::courses::{can_manage_class, forbidden, load_class};
use crate::services::{current_user, percentage, server_error};

/// 学生 × 课次矩阵，没有记录的格子为缺勤；同时返回各状态合计
pub(crate) fn attendance_matrix(
    enrollments: &[EnrollmentDetail],
    sessions: &[SessionWithClass],
    records: &[StudentAttendance],
) -> (Vec<StudentMatrixRow>, StatusCounts) {
    let mut rows: Vec<StudentMatrixRow> = enrollments
        .iter()
        .filter(|e| e.enrollment.status == EnrollmentStatus::Enrolled)
        .map(|e| StudentMatrixRow {
            student_id: e.enrollment.student_id,
            user_id: e.student_user_id.clone(),
            full_name: e.student_name.clone(),
            email: e.student_email.clone(),
            sessions: sessions
                .iter()
                .map(|s| {
                    (
                        s.session.id,
                        MatrixCell {
                            status: AttendanceStatus::Absent,
                            check_in_time: None,
                        },
                    )
                })
                .collect(),
        })
        .collect();

    for record in records {
        let cell = rows
            .iter_mut()
            .find(|row| row.student_id == record.student_id)
            .and_then(|row| row.sessions.get_mut(&record.session_id));
        if let Some(cell) = cell {
            *cell = MatrixCell {
                status: record.status,
                check_in_time: record.check_in_time,
            };
        }
    }

    rows.sort_by(|a, b| a.full_name.cmp(&b.full_name));

    let mut summary = StatusCounts::default();
    for cell in rows.iter().flat_map(|row| row.sessions.values()) {
        summary.add(cell.status);
    }
    (rows, summary)
}

fn class_info(class: &CourseClass, course_code: String, course_name: String) -> ReportClassInfo {
    ReportClassInfo {
        class_id: class.id,
        class_name: class.class_name.clone(),
        course_code,
        course_name,
        lecturer_name: class.lecturer_name.clone(),
        room: class.room.clone(),
        semester_period: class.semester_period.to_string(),
        academic_year: class.academic_year.clone(),
    }
}

pub async fn class_attendance_report(
    service: &ReportService,
    class_id: i64,
    range: ReportDateRange,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    if let Err(resp) = validate_range(&range) {
        return Ok(resp);
    }
    let storage = service.get_storage(request)?;

    let class = match load_class(&storage, class_id).await {
        Ok(class) => class,
        Err(resp) => return Ok(resp),
    };
    if !can_manage_class(&user, &class) {
        return Ok(forbidden("Anda tidak memiliki akses ke kelas ini"));
    }

    let course = match storage.get_course_by_id(class.course_id).await {
        Ok(course) => course,
        Err(e) => return Ok(server_error("Gagal membuat laporan kehadiran kelas", e)),
    };
    let sessions = match held_sessions(&storage, vec![class_id], &range).await {
        Ok(sessions) => sessions,
        Err(e) => return Ok(server_error("Gagal membuat laporan kehadiran kelas", e)),
    };
    let session_ids: Vec<i64> = sessions.iter().map(|s| s.session.id).collect();
    let records = match storage.list_attendances_for_sessions(&session_ids).await {
        Ok(records) => records,
        Err(e) => return Ok(server_error("Gagal membuat laporan kehadiran kelas", e)),
    };
    let enrollments = match storage.list_class_enrollments(class_id).await {
        Ok(enrollments) => enrollments,
        Err(e) => return Ok(server_error("Gagal membuat laporan kehadiran kelas", e)),
    };

    let (attendance_matrix, summary) = attendance_matrix(&enrollments, &sessions, &records);
    let total_sessions = sessions.len() as u64;
    let total_students = attendance_matrix.len() as u64;
    let statistics = ClassReportStatistics {
        total_sessions,
        total_students,
        attendance_rate: percentage(summary.attended(), total_sessions * total_students),
        summary,
    };

    let (course_code, course_name) = course
        .map(|c| (c.course_code, c.course_name))
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ClassAttendanceReport {
            class_info: class_info(&class, course_code, course_name),
            date_range: range,
            sessions: sessions
                .into_iter()
                .map(|s| ReportSession {
                    id: s.session.id,
                    session_number: s.session.session_number,
                    session_date: s.session.session_date,
                    start_time: s.session.start_time,
                    end_time: s.session.end_time,
                    topic: s.session.topic,
                })
                .collect(),
            attendance_matrix,
            statistics,
            generated_at: chrono::Utc::now(),
            generated_by: user.id,
        },
        "Laporan kehadiran kelas berhasil dibuat",
    )))
}

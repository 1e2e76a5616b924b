use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, validate_range};
use crate::models::attendance::entities::{SessionStatus, StudentAttendance};
use crate::models::attendance::requests::SessionFilter;
use crate::models::attendance::responses::StatusCounts;
use crate::models::courses::entities::ClassStatus;
use crate::models::courses::requests::ClassFilter;
use crate::models::courses::responses::CourseClassDetail;
use crate::models::dashboard::responses::SessionWithClass;
use crate::models::reports::requests::ReportDateRange;
use crate::models::reports::responses::{LecturerAttendanceSummary, LecturerClassSummary};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::courses::forbidden;
use crate::services::{current_user, percentage, server_error};

pub(crate) fn class_summaries(
    classes: &[CourseClassDetail],
    sessions: &[SessionWithClass],
    records: &[StudentAttendance],
) -> Vec<LecturerClassSummary> {
    classes
        .iter()
        .map(|detail| {
            let class_sessions: Vec<&SessionWithClass> = sessions
                .iter()
                .filter(|s| {
                    s.session.class_id == detail.class.id
                        && s.session.status != SessionStatus::Cancelled
                })
                .collect();
            let held: Vec<i64> = class_sessions
                .iter()
                .filter(|s| {
                    matches!(
                        s.session.status,
                        SessionStatus::Ongoing | SessionStatus::Completed
                    )
                })
                .map(|s| s.session.id)
                .collect();

            let mut counts = StatusCounts::default();
            for record in records.iter().filter(|r| held.contains(&r.session_id)) {
                counts.add(record.status);
            }
            let sessions_held = held.len() as u64;
            LecturerClassSummary {
                class_id: detail.class.id,
                class_name: detail.class.class_name.clone(),
                course_code: detail.course_code.clone(),
                course_name: detail.course_name.clone(),
                students: detail.enrolled_count,
                total_sessions: class_sessions.len() as u64,
                sessions_held,
                attendance_rate: percentage(
                    counts.attended(),
                    sessions_held * detail.enrolled_count,
                ),
            }
        })
        .collect()
}

/// 有课次的班级的平均出勤率
pub(crate) fn average_rate(classes: &[LecturerClassSummary]) -> f64 {
    let rates: Vec<f64> = classes
        .iter()
        .filter(|c| c.sessions_held > 0)
        .map(|c| c.attendance_rate)
        .collect();
    if rates.is_empty() {
        return 0.0;
    }
    (rates.iter().sum::<f64>() / rates.len() as f64 * 10.0).round() / 10.0
}

pub async fn lecturer_attendance_summary(
    service: &ReportService,
    lecturer_id: i64,
    range: ReportDateRange,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    if user.role != UserRole::Admin && user.id != lecturer_id {
        return Ok(forbidden("Anda hanya dapat mengakses ringkasan sendiri"));
    }
    if let Err(resp) = validate_range(&range) {
        return Ok(resp);
    }
    let storage = service.get_storage(request)?;

    let lecturer = match storage.get_user_by_id(lecturer_id).await {
        Ok(Some(lecturer)) if lecturer.role == UserRole::Lecturer => lecturer,
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "Dosen tidak ditemukan",
            )));
        }
        Err(e) => return Ok(server_error("Gagal membuat ringkasan dosen", e)),
    };

    let classes = storage
        .list_class_details(ClassFilter {
            lecturer_id: Some(lecturer_id),
            statuses: vec![ClassStatus::Active],
            ..Default::default()
        })
        .await;
    let classes = match classes {
        Ok(classes) => classes,
        Err(e) => return Ok(server_error("Gagal membuat ringkasan dosen", e)),
    };

    let sessions = storage
        .list_sessions(SessionFilter {
            class_ids: Some(classes.iter().map(|c| c.class.id).collect()),
            date_from: range.start_date.clone(),
            date_to: range.end_date.clone(),
            statuses: vec![],
        })
        .await;
    let sessions = match sessions {
        Ok(sessions) => sessions,
        Err(e) => return Ok(server_error("Gagal membuat ringkasan dosen", e)),
    };
    let held_ids: Vec<i64> = sessions
        .iter()
        .filter(|s| {
            matches!(
                s.session.status,
                SessionStatus::Ongoing | SessionStatus::Completed
            )
        })
        .map(|s| s.session.id)
        .collect();
    let records = match storage.list_attendances_for_sessions(&held_ids).await {
        Ok(records) => records,
        Err(e) => return Ok(server_error("Gagal membuat ringkasan dosen", e)),
    };

    let summaries = class_summaries(&classes, &sessions, &records);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        LecturerAttendanceSummary {
            lecturer_id: lecturer.id,
            lecturer_name: lecturer.full_name,
            total_classes: summaries.len() as u64,
            total_sessions_held: summaries.iter().map(|c| c.sessions_held).sum(),
            average_attendance_rate: average_rate(&summaries),
            classes: summaries,
        },
        "Ringkasan kehadiran dosen berhasil dibuat",
    )))
}

use std::collections::{HashMap, HashSet};

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttendanceService;
use crate::models::attendance::entities::{SessionStatus, StudentAttendance};
use crate::models::attendance::requests::SessionFilter;
use crate::models::attendance::responses::{
    AttendanceStatisticsResponse, StatusCounts, StudentAttendanceStatistic,
};
use crate::models::courses::entities::EnrollmentStatus;
use crate::models::courses::responses::EnrollmentDetail;
use crate::models::ApiResponse;
use crate::services::courses::{can_manage_class, forbidden, load_class};
use crate::services::system::DynamicConfig;
use crate::services::{current_user, percentage, server_error};

/// 每个在读学生的统计，分母为已开始或已结束的课次数
pub(crate) fn student_statistics(
    enrollments: &[EnrollmentDetail],
    records: &[StudentAttendance],
    held_sessions: u64,
    minimum_percentage: f64,
) -> Vec<StudentAttendanceStatistic> {
    let mut per_student: HashMap<i64, StatusCounts> = HashMap::new();
    for record in records {
        per_student
            .entry(record.student_id)
            .or_default()
            .add(record.status);
    }

    enrollments
        .iter()
        .filter(|e| e.enrollment.status == EnrollmentStatus::Enrolled)
        .map(|e| {
            let counts = per_student
                .remove(&e.enrollment.student_id)
                .unwrap_or_default();
            let attendance_percentage = percentage(counts.attended(), held_sessions);
            StudentAttendanceStatistic {
                student_id: e.enrollment.student_id,
                student_user_id: e.student_user_id.clone(),
                student_name: e.student_name.clone(),
                below_minimum: held_sessions > 0 && attendance_percentage < minimum_percentage,
                attendance_percentage,
                counts,
            }
        })
        .collect()
}

pub async fn class_statistics(
    service: &AttendanceService,
    class_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let class = match load_class(&storage, class_id).await {
        Ok(class) => class,
        Err(resp) => return Ok(resp),
    };
    if !can_manage_class(&user, &class) {
        return Ok(forbidden("Anda tidak memiliki akses ke kelas ini"));
    }

    let sessions = storage
        .list_sessions(SessionFilter {
            class_ids: Some(vec![class_id]),
            ..Default::default()
        })
        .await;
    let sessions = match sessions {
        Ok(sessions) => sessions,
        Err(e) => return Ok(server_error("Gagal mengambil statistik kehadiran", e)),
    };

    let held: HashSet<i64> = sessions
        .iter()
        .filter(|s| {
            matches!(
                s.session.status,
                SessionStatus::Ongoing | SessionStatus::Completed
            )
        })
        .map(|s| s.session.id)
        .collect();
    let total_sessions = sessions
        .iter()
        .filter(|s| s.session.status != SessionStatus::Cancelled)
        .count() as u64;
    let completed_sessions = sessions
        .iter()
        .filter(|s| s.session.status == SessionStatus::Completed)
        .count() as u64;

    let held_ids: Vec<i64> = held.iter().copied().collect();
    let records = match storage.list_attendances_for_sessions(&held_ids).await {
        Ok(records) => records,
        Err(e) => return Ok(server_error("Gagal mengambil statistik kehadiran", e)),
    };
    let enrollments = match storage.list_class_enrollments(class_id).await {
        Ok(enrollments) => enrollments,
        Err(e) => return Ok(server_error("Gagal mengambil statistik kehadiran", e)),
    };

    let mut counts = StatusCounts::default();
    for record in &records {
        counts.add(record.status);
    }
    let minimum = DynamicConfig::min_attendance_percentage().await;
    let students = student_statistics(&enrollments, &records, held.len() as u64, minimum);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AttendanceStatisticsResponse {
            class_id,
            total_sessions,
            completed_sessions,
            attendance_rate: percentage(counts.attended(), counts.total()),
            counts,
            students,
        },
        "Statistik kehadiran berhasil diambil",
    )))
}

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Datelike, NaiveDate};

use super::DashboardService;
use super::student::load_student_attendance;
use crate::models::dashboard::requests::CalendarParams;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::courses::forbidden;
use crate::services::{campus_today, current_user, server_error};
use crate::utils::calendar::{build_month, collect_day_statuses, days_in_month};
use crate::utils::schedule::parse_date;

fn bad_request(msg: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
}

pub async fn attendance_calendar(
    service: &DashboardService,
    params: CalendarParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let student_id = match (user.role, params.student_id) {
        (UserRole::Student, Some(id)) if id != user.id => {
            return Ok(forbidden(
                "Anda hanya dapat mengakses kalender kehadiran sendiri",
            ));
        }
        (UserRole::Student, _) => user.id,
        (_, Some(id)) => id,
        (_, None) => return Ok(bad_request("student_id wajib diisi")),
    };

    let today = campus_today();
    let year = params.year.unwrap_or(today.year());
    let month = params.month.unwrap_or(today.month());
    if !(1..=12).contains(&month) {
        return Ok(bad_request("Bulan harus antara 1 dan 12"));
    }
    let last_day = match days_in_month(year, month) {
        Ok(days) => days,
        Err(_) => return Ok(bad_request("Tahun tidak valid")),
    };

    let storage = service.get_storage(request)?;
    let data = match load_student_attendance(
        &storage,
        student_id,
        Some(format!("{year:04}-{month:02}-01")),
        Some(format!("{year:04}-{month:02}-{last_day:02}")),
    )
    .await
    {
        Ok(data) => data,
        Err(e) => return Ok(server_error("Gagal mengambil kalender kehadiran", e)),
    };

    let session_dates: std::collections::HashMap<i64, NaiveDate> = data
        .sessions
        .iter()
        .filter_map(|s| {
            parse_date(&s.session.session_date)
                .ok()
                .map(|date| (s.session.id, date))
        })
        .collect();
    let statuses = collect_day_statuses(data.records.iter().filter_map(|record| {
        session_dates
            .get(&record.session_id)
            .map(|date| (*date, record.status))
    }));

    match build_month(year, month, &statuses, today) {
        Ok(calendar) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            calendar,
            "Kalender kehadiran berhasil diambil",
        ))),
        Err(e) => Ok(server_error("Gagal mengambil kalender kehadiran", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::{AttendanceMethod, AttendanceStatus};
    use crate::models::attendance::requests::NewStudentAttendance;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{
        class_with_schedule, new_session, storage, user,
    };
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_calendar_marks_worst_status_of_day() {
        let raw = storage().await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let class = class_with_schedule(&raw, "TI101", None, vec![]).await;
        raw.create_enrollment_impl(student.id, class.id).await.unwrap();

        for (start, end, status) in [
            ("08:00", "10:00", AttendanceStatus::Present),
            ("10:00", "12:00", AttendanceStatus::Late),
        ] {
            let session = raw
                .create_session_impl(new_session(class.id, "2025-06-02", start, end))
                .await
                .unwrap();
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
        let storage = shared(raw);

        let resp = attendance_calendar(
            &DashboardService::new_lazy(),
            CalendarParams {
                year: Some(2025),
                month: Some(6),
                student_id: None,
            },
            &request_as(&storage, Some(&student)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        let data = &body["data"];
        assert_eq!(data["month_name"], "Juni");
        // 2025-06-01 是周日
        assert_eq!(data["leading_blanks"], 0);
        assert_eq!(data["cells"][1]["status"], "late");
        assert_eq!(data["cells"][1]["label"], "Terlambat");
        assert_eq!(data["cells"][2]["status"], "no_class");
        assert_eq!(data["summary"]["late"], 1);
    }

    #[actix_web::test]
    async fn test_calendar_rejects_other_student_and_bad_month() {
        let raw = storage().await;
        let me = user(&raw, "220211060001", UserRole::Student).await;
        let other = user(&raw, "220211060002", UserRole::Student).await;
        let storage = shared(raw);
        let service = DashboardService::new_lazy();

        let resp = attendance_calendar(
            &service,
            CalendarParams {
                year: None,
                month: None,
                student_id: Some(other.id),
            },
            &request_as(&storage, Some(&me)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = attendance_calendar(
            &service,
            CalendarParams {
                year: Some(2025),
                month: Some(13),
                student_id: None,
            },
            &request_as(&storage, Some(&me)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

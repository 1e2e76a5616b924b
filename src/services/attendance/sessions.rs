use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AttendanceService, load_managed_session};
use crate::models::attendance::entities::{
    AttendanceMethod, AttendanceSession, SessionStatus, SessionType,
};
use crate::models::attendance::requests::{
    CreateSessionRequest, NewAttendanceSession, SessionFilter, SessionListParams,
};
use crate::models::attendance::responses::SessionResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::courses::{can_manage_class, load_class};
use crate::services::{current_user, server_error};
use crate::utils::schedule::{clock_ranges_overlap, parse_clock, parse_date};

/// 日期与起止时间格式，且开始早于结束
pub(crate) fn validate_session_times(date: &str, start: &str, end: &str) -> Result<(), String> {
    parse_date(date).map_err(|e| e.message().to_string())?;
    let start_at = parse_clock(start).map_err(|e| e.message().to_string())?;
    let end_at = parse_clock(end).map_err(|e| e.message().to_string())?;
    if start_at >= end_at {
        return Err("Waktu mulai harus lebih awal dari waktu selesai".to_string());
    }
    Ok(())
}

/// 同日未取消课次中第一个与新时段重叠的
pub(crate) fn overlapping_session<'a, I>(
    sessions: I,
    start: &str,
    end: &str,
) -> Option<&'a AttendanceSession>
where
    I: IntoIterator<Item = &'a AttendanceSession>,
{
    sessions.into_iter().find(|s| {
        s.status != SessionStatus::Cancelled
            && clock_ranges_overlap(&s.start_time, &s.end_time, start, end).unwrap_or(false)
    })
}

pub async fn create_session(
    service: &AttendanceService,
    session: CreateSessionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;

    if session.session_date.trim().is_empty()
        || session.start_time.trim().is_empty()
        || session.end_time.trim().is_empty()
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Semua field wajib harus diisi",
        )));
    }
    if let Err(msg) =
        validate_session_times(&session.session_date, &session.start_time, &session.end_time)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            msg,
        )));
    }

    let storage = service.get_storage(request)?;

    let class = match load_class(&storage, session.class_id).await {
        Ok(class) => class,
        Err(resp) => return Ok(resp),
    };
    if !can_manage_class(&user, &class) {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Kelas tidak ditemukan atau Anda tidak memiliki akses",
        )));
    }

    let same_day = storage
        .list_sessions(SessionFilter {
            class_ids: Some(vec![class.id]),
            date_from: Some(session.session_date.clone()),
            date_to: Some(session.session_date.clone()),
            statuses: Vec::new(),
        })
        .await;
    let same_day = match same_day {
        Ok(sessions) => sessions,
        Err(e) => return Ok(server_error("Gagal membuat sesi kehadiran", e)),
    };
    if overlapping_session(
        same_day.iter().map(|s| &s.session),
        &session.start_time,
        &session.end_time,
    )
    .is_some()
    {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::SessionOverlap,
            "Sudah ada sesi kehadiran pada waktu yang sama",
        )));
    }

    let new_session = NewAttendanceSession {
        class_id: class.id,
        session_date: session.session_date,
        start_time: session.start_time,
        end_time: session.end_time,
        topic: session.topic,
        session_type: session.session_type.unwrap_or(SessionType::Lecture),
        attendance_method: session.attendance_method.unwrap_or(AttendanceMethod::Manual),
        notes: session.notes,
        created_by: Some(user.id),
    };

    match storage.create_session(new_session).await {
        Ok(created) => {
            info!(
                "Session #{} created for class {} on {}",
                created.session_number, created.class_id, created.session_date
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                SessionResponse { session: created },
                "Sesi kehadiran berhasil dibuat",
            )))
        }
        Err(e) => Ok(server_error("Gagal membuat sesi kehadiran", e)),
    }
}

pub async fn list_class_sessions(
    service: &AttendanceService,
    class_id: i64,
    query: SessionListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_class(&storage, class_id).await {
        return Ok(resp);
    }

    match storage.list_class_sessions(class_id, query).await {
        Ok(sessions) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            sessions,
            "Sesi kehadiran berhasil diambil",
        ))),
        Err(e) => Ok(server_error("Gagal mengambil sesi kehadiran", e)),
    }
}

/// 状态流转：只允许 `from` -> `to`
async fn transition(
    service: &AttendanceService,
    session_id: i64,
    from: SessionStatus,
    to: SessionStatus,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let (session, _) = match load_managed_session(&storage, &user, session_id).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    let (invalid_msg, ok_msg, fail_msg) = match to {
        SessionStatus::Ongoing => (
            "Sesi kehadiran sudah dimulai atau selesai",
            "Sesi kehadiran berhasil dimulai",
            "Gagal memulai sesi kehadiran",
        ),
        _ => (
            "Sesi kehadiran belum dimulai atau sudah selesai",
            "Sesi kehadiran berhasil diakhiri",
            "Gagal mengakhiri sesi kehadiran",
        ),
    };

    if session.status != from {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::SessionStateInvalid,
            invalid_msg,
        )));
    }

    match storage.update_session_status(session_id, to).await {
        Ok(Some(updated)) => {
            info!("Session {} moved from {} to {}", session_id, from, to);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                SessionResponse { session: updated },
                ok_msg,
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SessionNotFound,
            "Sesi kehadiran tidak ditemukan",
        ))),
        Err(e) => Ok(server_error(fail_msg, e)),
    }
}

pub async fn start_session(
    service: &AttendanceService,
    session_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    transition(
        service,
        session_id,
        SessionStatus::Scheduled,
        SessionStatus::Ongoing,
        request,
    )
    .await
}

pub async fn end_session(
    service: &AttendanceService,
    session_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    transition(
        service,
        session_id,
        SessionStatus::Ongoing,
        SessionStatus::Completed,
        request,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{class_with_schedule, storage, user};
    use actix_web::http::StatusCode;

    fn create(class_id: i64, start: &str, end: &str) -> CreateSessionRequest {
        CreateSessionRequest {
            class_id,
            session_date: "2025-06-02".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            topic: Some("Pertemuan".to_string()),
            session_type: None,
            attendance_method: None,
            notes: None,
        }
    }

    #[test]
    fn test_validate_session_times() {
        assert!(validate_session_times("2025-06-02", "08:00", "10:00").is_ok());
        assert!(validate_session_times("2025-06-31", "08:00", "10:00").is_err());
        assert!(validate_session_times("2025-06-02", "10:00", "10:00").is_err());
        assert!(validate_session_times("2025-06-02", "8am", "10:00").is_err());
    }

    #[actix_web::test]
    async fn test_session_lifecycle() {
        let raw = storage().await;
        let lecturer = user(&raw, "198703152015041001", UserRole::Lecturer).await;
        let class = class_with_schedule(&raw, "TI101", Some(lecturer.id), vec![]).await;
        let storage = shared(raw);
        let req = request_as(&storage, Some(&lecturer));
        let service = AttendanceService::new_lazy();

        let resp = create_session(&service, create(class.id, "08:00", "10:00"), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        let session_id = body["data"]["session"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["session"]["session_number"], 1);
        assert_eq!(body["data"]["session"]["status"], "scheduled");

        // 时段重叠
        let resp = create_session(&service, create(class.id, "09:00", "11:00"), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // 首尾相接不算重叠
        let resp = create_session(&service, create(class.id, "10:00", "12:00"), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = end_session(&service, session_id, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = start_session(&service, session_id, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["session"]["status"], "ongoing");

        let resp = start_session(&service, session_id, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = end_session(&service, session_id, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["session"]["status"], "completed");
    }

    #[actix_web::test]
    async fn test_other_lecturer_cannot_create_session() {
        let raw = storage().await;
        let owner = user(&raw, "198703152015041001", UserRole::Lecturer).await;
        let other = user(&raw, "198703152015041002", UserRole::Lecturer).await;
        let class = class_with_schedule(&raw, "TI101", Some(owner.id), vec![]).await;
        let storage = shared(raw);

        let resp = create_session(
            &AttendanceService::new_lazy(),
            create(class.id, "08:00", "10:00"),
            &request_as(&storage, Some(&other)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

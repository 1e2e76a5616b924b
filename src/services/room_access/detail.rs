use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Duration;

use super::RoomAccessService;
use super::list::room_access_of;
use crate::config::AppConfig;
use crate::models::attendance::requests::SessionFilter;
use crate::models::courses::requests::ClassFilter;
use crate::models::room_access::responses::ClassAccessDetailResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::courses::load_class;
use crate::services::{campus_today, server_error};

const RECENT_DAYS: i64 = 7;
const RECENT_LIMIT: u64 = 50;

pub async fn class_access_detail(
    service: &RoomAccessService,
    class_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let class = match load_class(&storage, class_id).await {
        Ok(class) => class,
        Err(resp) => return Ok(resp),
    };
    let detail = match storage
        .list_class_details(ClassFilter {
            course_id: Some(class.course_id),
            ..Default::default()
        })
        .await
    {
        Ok(details) => details.into_iter().find(|d| d.class.id == class_id),
        Err(e) => return Ok(server_error("Gagal mengambil detail akses kelas", e)),
    };
    let Some(detail) = detail else {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Kelas tidak ditemukan",
        )));
    };

    let today = campus_today();
    let today_str = today.format("%Y-%m-%d").to_string();
    let sessions = match storage
        .list_sessions(SessionFilter {
            class_ids: Some(vec![class_id]),
            date_from: Some(today_str.clone()),
            date_to: Some(today_str),
            statuses: Vec::new(),
        })
        .await
    {
        Ok(sessions) => sessions,
        Err(e) => return Ok(server_error("Gagal mengambil detail akses kelas", e)),
    };
    let session_ids: Vec<i64> = sessions.iter().map(|s| s.session.id).collect();
    let records = match storage.list_attendances_for_sessions(&session_ids).await {
        Ok(records) => records,
        Err(e) => return Ok(server_error("Gagal mengambil detail akses kelas", e)),
    };

    let since = (chrono::Utc::now() - Duration::days(RECENT_DAYS)).timestamp();
    let recent_logs = match storage
        .list_recent_door_logs(class_id, since, RECENT_LIMIT)
        .await
    {
        Ok(logs) => logs,
        Err(e) => return Ok(server_error("Gagal mengambil detail akses kelas", e)),
    };

    let offset = AppConfig::get().campus_offset();
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ClassAccessDetailResponse {
            class: room_access_of(detail, today, &sessions, &records, offset),
            recent_logs,
        },
        "Detail akses kelas berhasil diambil",
    )))
}

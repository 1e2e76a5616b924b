use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttendanceService;
use crate::models::attendance::requests::AttendanceHistoryParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::server_error;
use crate::utils::schedule::parse_date;

pub async fn attendance_history(
    service: &AttendanceService,
    query: AttendanceHistoryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    for date in [&query.start_date, &query.end_date].into_iter().flatten() {
        if parse_date(date).is_err() {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "Format tanggal harus YYYY-MM-DD",
            )));
        }
    }

    let storage = service.get_storage(request)?;

    match storage.list_attendance_history(query).await {
        Ok(history) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            history,
            "Riwayat kehadiran berhasil diambil",
        ))),
        Err(e) => Ok(server_error("Gagal mengambil riwayat kehadiran", e)),
    }
}

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use super::create::validate_course_fields;
use crate::models::courses::{requests::UpdateCourseRequest, responses::CourseResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::server_error;
use crate::utils::validate::validate_course_code;

pub async fn update_course(
    service: &CourseService,
    course_id: i64,
    mut update: UpdateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_course_fields(update.credits, update.semester) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    let storage = service.get_storage(request)?;

    if let Some(code) = update.course_code.as_mut() {
        *code = code.trim().to_uppercase();
        if let Err(msg) = validate_course_code(code) {
            return Ok(
                HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
            );
        }
        match storage.get_course_by_code(code).await {
            Ok(Some(other)) if other.id != course_id => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::CourseCodeAlreadyExists,
                    "Kode mata kuliah sudah ada",
                )));
            }
            Ok(_) => {}
            Err(e) => return Ok(server_error("Gagal memperbarui mata kuliah", e)),
        }
    }

    match storage.update_course(course_id, update).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CourseResponse { course },
            "Mata kuliah berhasil diperbarui",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Mata kuliah tidak ditemukan",
        ))),
        Err(e) => Ok(server_error("Gagal memperbarui mata kuliah", e)),
    }
}

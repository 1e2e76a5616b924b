use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::models::courses::{requests::CreateCourseRequest, responses::CourseResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::server_error;
use crate::utils::validate::validate_course_code;

/// 课程字段校验，学分 1..=6，学期 1..=8
pub(crate) fn validate_course_fields(
    credits: Option<i32>,
    semester: Option<i32>,
) -> Result<(), &'static str> {
    if credits.is_some_and(|c| !(1..=6).contains(&c)) {
        return Err("SKS harus antara 1 dan 6");
    }
    if semester.is_some_and(|s| !(1..=8).contains(&s)) {
        return Err("Semester harus antara 1 dan 8");
    }
    Ok(())
}

pub async fn create_course(
    service: &CourseService,
    mut course: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    course.course_code = course.course_code.trim().to_uppercase();
    course.course_name = course.course_name.trim().to_string();
    course.program_study = course.program_study.trim().to_string();

    if course.course_name.is_empty() || course.program_study.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Semua field wajib harus diisi",
        )));
    }
    if let Err(msg) = validate_course_code(&course.course_code) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }
    if let Err(msg) = validate_course_fields(Some(course.credits), Some(course.semester)) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    let storage = service.get_storage(request)?;

    match storage.get_course_by_code(&course.course_code).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::CourseCodeAlreadyExists,
                "Kode mata kuliah sudah ada",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(server_error("Gagal membuat mata kuliah", e)),
    }

    match storage.create_course(course).await {
        Ok(course) => {
            info!("Course {} created", course.course_code);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                CourseResponse { course },
                "Mata kuliah berhasil dibuat",
            )))
        }
        Err(e) => Ok(server_error("Gagal membuat mata kuliah", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::storage;
    use actix_web::http::StatusCode;

    fn course(code: &str) -> CreateCourseRequest {
        CreateCourseRequest {
            course_code: code.to_string(),
            course_name: "Algoritma dan Pemrograman".to_string(),
            credits: 3,
            semester: 1,
            program_study: "Teknik Informatika".to_string(),
            description: None,
            prerequisites: vec![],
        }
    }

    #[test]
    fn test_course_field_ranges() {
        assert!(validate_course_fields(Some(3), Some(8)).is_ok());
        assert!(validate_course_fields(Some(0), None).is_err());
        assert!(validate_course_fields(None, Some(9)).is_err());
        assert!(validate_course_fields(None, None).is_ok());
    }

    #[actix_web::test]
    async fn test_duplicate_code_rejected() {
        let storage = shared(storage().await);
        let req = request_as(&storage, None);
        let service = CourseService::new_lazy();

        let resp = create_course(&service, course("ti102"), &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["course"]["course_code"], "TI102");

        let resp = create_course(&service, course("TI102"), &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let mut bad = course("TI103");
        bad.credits = 7;
        let resp = create_course(&service, bad, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

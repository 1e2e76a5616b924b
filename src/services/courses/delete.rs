use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::courses::entities::ClassStatus;
use crate::models::courses::requests::ClassFilter;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::server_error;

pub async fn delete_course(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Mata kuliah tidak ditemukan",
            )));
        }
        Err(e) => return Ok(server_error("Gagal menghapus mata kuliah", e)),
    }

    // 有活动班级时不能删除
    let active_classes = storage
        .list_class_details(ClassFilter {
            course_id: Some(course_id),
            statuses: vec![ClassStatus::Active],
            ..Default::default()
        })
        .await;
    match active_classes {
        Ok(classes) if !classes.is_empty() => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::CourseHasActiveClasses,
                "Tidak dapat menghapus mata kuliah yang memiliki kelas aktif",
            )));
        }
        Ok(_) => {}
        Err(e) => return Ok(server_error("Gagal menghapus mata kuliah", e)),
    }

    match storage.delete_course(course_id).await {
        Ok(true) => {
            tracing::info!("Course {} deleted", course_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Mata kuliah berhasil dihapus")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Mata kuliah tidak ditemukan",
        ))),
        Err(e) => Ok(server_error("Gagal menghapus mata kuliah", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{class_with_schedule, storage};
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_delete_blocked_by_active_class() {
        let raw = storage().await;
        let class = class_with_schedule(&raw, "TI101", None, vec![]).await;
        let storage = shared(raw);
        let req = request_as(&storage, None);
        let service = CourseService::new_lazy();

        let resp = delete_course(&service, class.course_id, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        storage
            .update_class_status(class.id, ClassStatus::Completed)
            .await
            .unwrap();
        let resp = delete_course(&service, class.course_id, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = delete_course(&service, class.course_id, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

pub mod classes;
pub mod create;
pub mod delete;
pub mod enrollments;
pub mod list;
pub mod overview;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::courses::entities::CourseClass;
use crate::models::courses::requests::{
    CourseListParams, CourseOverviewParams, CreateClassRequest, CreateCourseRequest,
    EnrollRequest, UpdateCourseRequest, UpdateEnrollmentStatusRequest,
};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_courses(
        &self,
        query: CourseListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, query, request).await
    }

    pub async fn create_course(
        &self,
        course: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, course, request).await
    }

    pub async fn update_course(
        &self,
        course_id: i64,
        update: UpdateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_course(self, course_id, update, request).await
    }

    pub async fn delete_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_course(self, course_id, request).await
    }

    pub async fn list_course_classes(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        classes::list_course_classes(self, course_id, request).await
    }

    pub async fn create_class(
        &self,
        class: CreateClassRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        classes::create_class(self, class, request).await
    }

    pub async fn list_class_enrollments(
        &self,
        class_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enrollments::list_class_enrollments(self, class_id, request).await
    }

    pub async fn enroll(
        &self,
        enroll: EnrollRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enrollments::enroll_student(self, enroll, request).await
    }

    pub async fn update_enrollment_status(
        &self,
        enrollment_id: i64,
        update: UpdateEnrollmentStatusRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enrollments::update_enrollment_status(self, enrollment_id, update, request).await
    }

    pub async fn overview(
        &self,
        query: CourseOverviewParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        overview::course_overview(self, query, request).await
    }
}

/// 管理员可管理所有班级，教师只能管理自己任课的班级
pub(crate) fn can_manage_class(user: &User, class: &CourseClass) -> bool {
    user.is_admin() || (user.role == UserRole::Lecturer && class.lecturer_id == Some(user.id))
}

/// 读取班级，不存在时返回 404 响应
pub(crate) async fn load_class(
    storage: &Arc<dyn Storage>,
    class_id: i64,
) -> Result<CourseClass, HttpResponse> {
    match storage.get_course_class_by_id(class_id).await {
        Ok(Some(class)) => Ok(class),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Kelas tidak ditemukan",
        ))),
        Err(e) => Err(super::server_error("Gagal mengambil data kelas", e)),
    }
}

pub(crate) fn forbidden(message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, message))
}

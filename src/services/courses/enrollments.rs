use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{CourseService, can_manage_class, forbidden, load_class};
use crate::models::courses::entities::{ClassStatus, EnrollmentStatus};
use crate::models::courses::requests::{EnrollRequest, UpdateEnrollmentStatusRequest};
use crate::models::courses::responses::{EnrollmentListResponse, EnrollmentResponse};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, server_error};

fn class_full() -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::ClassFull,
        "Kelas sudah penuh",
    ))
}

pub async fn list_class_enrollments(
    service: &CourseService,
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

    let items = match storage.list_class_enrollments(class_id).await {
        Ok(items) => items,
        Err(e) => return Ok(server_error("Gagal mengambil data mahasiswa", e)),
    };
    let total = items
        .iter()
        .filter(|item| item.enrollment.status == EnrollmentStatus::Enrolled)
        .count() as u64;
    let capacity = class.max_students;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        EnrollmentListResponse {
            class,
            items,
            total,
            capacity,
        },
        "Data mahasiswa berhasil diambil",
    )))
}

pub async fn enroll_student(
    service: &CourseService,
    enroll: EnrollRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;

    // 学生只能给自己选课
    let student_id = match (user.role, enroll.student_id) {
        (UserRole::Student, Some(id)) if id != user.id => {
            return Ok(forbidden("Anda hanya dapat mendaftarkan diri sendiri"));
        }
        (UserRole::Student, _) => user.id,
        (_, Some(id)) => id,
        (_, None) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "student_id wajib diisi",
            )));
        }
    };

    let storage = service.get_storage(request)?;

    let class = match load_class(&storage, enroll.class_id).await {
        Ok(class) => class,
        Err(resp) => return Ok(resp),
    };
    if class.status != ClassStatus::Active {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Kelas tidak aktif",
        )));
    }
    if user.role == UserRole::Lecturer && class.lecturer_id != Some(user.id) {
        return Ok(forbidden("Anda tidak memiliki akses ke kelas ini"));
    }

    match storage.get_user_by_id(student_id).await {
        Ok(Some(student)) if student.role == UserRole::Student => {}
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Mahasiswa tidak ditemukan",
            )));
        }
        Err(e) => return Ok(server_error("Gagal mendaftarkan mahasiswa", e)),
    }

    let existing = match storage.find_enrollment(student_id, class.id).await {
        Ok(existing) => existing,
        Err(e) => return Ok(server_error("Gagal mendaftarkan mahasiswa", e)),
    };
    if existing
        .as_ref()
        .is_some_and(|e| e.status == EnrollmentStatus::Enrolled)
    {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::AlreadyEnrolled,
            "Mahasiswa sudah terdaftar di kelas ini",
        )));
    }

    match storage.count_class_enrollments(class.id).await {
        Ok(count) if count >= class.max_students.max(0) as u64 => return Ok(class_full()),
        Ok(_) => {}
        Err(e) => return Ok(server_error("Gagal mendaftarkan mahasiswa", e)),
    }

    // 退课后重新选课沿用原记录
    let result = match existing {
        Some(previous) => storage
            .update_enrollment_status(
                previous.id,
                UpdateEnrollmentStatusRequest {
                    status: EnrollmentStatus::Enrolled,
                    final_grade: None,
                    final_score: None,
                },
            )
            .await
            .map(|updated| updated.unwrap_or(previous)),
        None => storage.create_enrollment(student_id, class.id).await,
    };

    match result {
        Ok(enrollment) => {
            info!("Student {} enrolled in class {}", student_id, class.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                EnrollmentResponse { enrollment },
                "Mahasiswa berhasil didaftarkan ke kelas",
            )))
        }
        Err(e) => Ok(server_error("Gagal mendaftarkan mahasiswa", e)),
    }
}

pub async fn update_enrollment_status(
    service: &CourseService,
    enrollment_id: i64,
    update: UpdateEnrollmentStatusRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let enrollment = match storage.get_enrollment_by_id(enrollment_id).await {
        Ok(Some(enrollment)) => enrollment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::EnrollmentNotFound,
                "Data pendaftaran tidak ditemukan",
            )));
        }
        Err(e) => return Ok(server_error("Gagal memperbarui status pendaftaran", e)),
    };

    let class = match load_class(&storage, enrollment.class_id).await {
        Ok(class) => class,
        Err(resp) => return Ok(resp),
    };
    if !can_manage_class(&user, &class) {
        return Ok(forbidden("Anda tidak memiliki akses ke kelas ini"));
    }

    if let Some(score) = update.final_score
        && !(0.0..=100.0).contains(&score)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Nilai akhir harus antara 0 dan 100",
        )));
    }

    // 改回在读同样占用名额
    if update.status == EnrollmentStatus::Enrolled
        && enrollment.status != EnrollmentStatus::Enrolled
    {
        match storage.count_class_enrollments(class.id).await {
            Ok(count) if count >= class.max_students.max(0) as u64 => return Ok(class_full()),
            Ok(_) => {}
            Err(e) => return Ok(server_error("Gagal memperbarui status pendaftaran", e)),
        }
    }

    match storage.update_enrollment_status(enrollment_id, update).await {
        Ok(Some(enrollment)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            EnrollmentResponse { enrollment },
            "Status pendaftaran berhasil diperbarui",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::EnrollmentNotFound,
            "Data pendaftaran tidak ditemukan",
        ))),
        Err(e) => Ok(server_error("Gagal memperbarui status pendaftaran", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{class_with_schedule, storage, user};
    use actix_web::http::StatusCode;

    fn enroll(class_id: i64, student_id: Option<i64>) -> EnrollRequest {
        EnrollRequest {
            class_id,
            student_id,
        }
    }

    #[actix_web::test]
    async fn test_student_enrolls_self_until_full() {
        let raw = storage().await;
        let class = class_with_schedule(&raw, "TI101", None, vec![]).await;
        let a = user(&raw, "220211060001", UserRole::Student).await;
        let b = user(&raw, "220211060002", UserRole::Student).await;
        let c = user(&raw, "220211060003", UserRole::Student).await;
        let storage = shared(raw);
        let service = CourseService::new_lazy();

        let req_a = request_as(&storage, Some(&a));
        let resp = enroll_student(&service, enroll(class.id, None), &req_a)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = enroll_student(&service, enroll(class.id, None), &req_a)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(resp).await["code"],
            ErrorCode::AlreadyEnrolled.code()
        );

        // 学生不能替别人选课
        let resp = enroll_student(&service, enroll(class.id, Some(c.id)), &req_a)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req_b = request_as(&storage, Some(&b));
        let resp = enroll_student(&service, enroll(class.id, None), &req_b)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req_c = request_as(&storage, Some(&c));
        let resp = enroll_student(&service, enroll(class.id, None), &req_c)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["code"], ErrorCode::ClassFull.code());
    }

    #[actix_web::test]
    async fn test_dropped_student_can_re_enroll() {
        let raw = storage().await;
        let admin = user(&raw, "ADMIN001", UserRole::Admin).await;
        let class = class_with_schedule(&raw, "TI101", None, vec![]).await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let enrollment = raw
            .create_enrollment_impl(student.id, class.id)
            .await
            .unwrap();
        let storage = shared(raw);
        let service = CourseService::new_lazy();
        let req = request_as(&storage, Some(&admin));

        let resp = update_enrollment_status(
            &service,
            enrollment.id,
            UpdateEnrollmentStatusRequest {
                status: EnrollmentStatus::Dropped,
                final_grade: None,
                final_score: None,
            },
            &req,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = list_class_enrollments(&service, class.id, &req)
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["data"]["total"], 0);

        let resp = enroll_student(&service, enroll(class.id, Some(student.id)), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["enrollment"]["id"], enrollment.id);
        assert_eq!(body["data"]["enrollment"]["status"], "enrolled");
    }

    #[actix_web::test]
    async fn test_other_lecturer_cannot_list_enrollments() {
        let raw = storage().await;
        let owner = user(&raw, "198703152015041001", UserRole::Lecturer).await;
        let other = user(&raw, "198703152015041002", UserRole::Lecturer).await;
        let class = class_with_schedule(&raw, "TI101", Some(owner.id), vec![]).await;
        let storage = shared(raw);
        let service = CourseService::new_lazy();

        let resp = list_class_enrollments(&service, class.id, &request_as(&storage, Some(&other)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = list_class_enrollments(&service, class.id, &request_as(&storage, Some(&owner)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_reactivating_dropped_enrollment_respects_capacity() {
        let raw = storage().await;
        let admin = user(&raw, "ADMIN001", UserRole::Admin).await;
        // 测试班级容量为 2
        let class = class_with_schedule(&raw, "TI101", None, vec![]).await;
        let a = user(&raw, "220211060001", UserRole::Student).await;
        let b = user(&raw, "220211060002", UserRole::Student).await;
        let c = user(&raw, "220211060003", UserRole::Student).await;
        let dropped = raw.create_enrollment_impl(a.id, class.id).await.unwrap();
        let storage = shared(raw);
        let service = CourseService::new_lazy();
        let req = request_as(&storage, Some(&admin));

        let status = |status| UpdateEnrollmentStatusRequest {
            status,
            final_grade: None,
            final_score: None,
        };

        let resp = update_enrollment_status(&service, dropped.id, status(EnrollmentStatus::Dropped), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        for student in [&b, &c] {
            let resp = enroll_student(&service, enroll(class.id, Some(student.id)), &req)
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let resp = update_enrollment_status(&service, dropped.id, status(EnrollmentStatus::Enrolled), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["code"], ErrorCode::ClassFull.code());

        let resp = list_class_enrollments(&service, class.id, &req).await.unwrap();
        assert_eq!(body_json(resp).await["data"]["total"], 2);
    }
}

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{CourseService, forbidden};
use crate::models::courses::entities::{ClassStatus, ScheduleSlot};
use crate::models::courses::requests::{ClassFilter, CreateClassRequest, NewCourseClass};
use crate::models::courses::responses::CourseClassListResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, server_error};
use crate::utils::schedule::{find_conflict, slots_conflict, validate_slot};

const DEFAULT_MAX_STUDENTS: i32 = 40;

/// 校验每个时段，并检查课表内部是否自相冲突
pub(crate) fn validate_schedule(slots: &[ScheduleSlot]) -> Result<(), String> {
    for slot in slots {
        validate_slot(slot).map_err(|e| e.message().to_string())?;
    }
    for (i, a) in slots.iter().enumerate() {
        if let Some(b) = slots[i + 1..].iter().find(|b| slots_conflict(a, b)) {
            return Err(format!(
                "Jadwal saling bentrok: {} {}-{} dan {}-{}",
                a.day, a.start_time, a.end_time, b.start_time, b.end_time
            ));
        }
    }
    Ok(())
}

pub async fn list_course_classes(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Mata kuliah tidak ditemukan",
            )));
        }
        Err(e) => return Ok(server_error("Gagal mengambil data kelas mata kuliah", e)),
    };

    let filter = ClassFilter {
        course_id: Some(course_id),
        ..Default::default()
    };
    match storage.list_class_details(filter).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CourseClassListResponse { course, items },
            "Data kelas berhasil diambil",
        ))),
        Err(e) => Ok(server_error("Gagal mengambil data kelas mata kuliah", e)),
    }
}

pub async fn create_class(
    service: &CourseService,
    class: CreateClassRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;

    if class.class_name.trim().is_empty() || class.academic_year.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Semua field wajib harus diisi",
        )));
    }
    let max_students = class.max_students.unwrap_or(DEFAULT_MAX_STUDENTS);
    if max_students < 1 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Kapasitas kelas minimal 1",
        )));
    }
    if let Err(msg) = validate_schedule(&class.schedule) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ScheduleInvalid,
            msg,
        )));
    }

    let storage = service.get_storage(request)?;

    match storage.get_course_by_id(class.course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Mata kuliah tidak ditemukan",
            )));
        }
        Err(e) => return Ok(server_error("Gagal membuat kelas", e)),
    }

    // 教师只能给自己开班
    let (lecturer_id, lecturer_name) = if user.role == UserRole::Lecturer {
        if class.lecturer_id.is_some_and(|id| id != user.id) {
            return Ok(forbidden("Dosen hanya dapat membuat kelas untuk dirinya sendiri"));
        }
        (Some(user.id), Some(user.full_name.clone()))
    } else if let Some(lecturer_id) = class.lecturer_id {
        match storage.get_user_by_id(lecturer_id).await {
            Ok(Some(lecturer)) if lecturer.role == UserRole::Lecturer => (
                Some(lecturer.id),
                class.lecturer_name.clone().or(Some(lecturer.full_name)),
            ),
            Ok(_) => {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::UserNotFound,
                    "Dosen tidak ditemukan",
                )));
            }
            Err(e) => return Ok(server_error("Gagal membuat kelas", e)),
        }
    } else {
        (None, class.lecturer_name.clone())
    };

    if let Some(lecturer_id) = lecturer_id
        && !class.schedule.is_empty()
    {
        let taught = storage
            .list_class_details(ClassFilter {
                lecturer_id: Some(lecturer_id),
                statuses: vec![ClassStatus::Active],
                ..Default::default()
            })
            .await;
        let taught = match taught {
            Ok(classes) => classes,
            Err(e) => return Ok(server_error("Gagal memeriksa jadwal dosen", e)),
        };
        for existing in &taught {
            if let Some((_, slot)) = find_conflict(&class.schedule, &existing.class.schedule) {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::ScheduleConflict,
                    format!(
                        "Jadwal bentrok dengan kelas {} {} ({} {}-{})",
                        existing.course_code,
                        existing.class.class_name,
                        slot.day,
                        slot.start_time,
                        slot.end_time
                    ),
                )));
            }
        }
    }

    let new_class = NewCourseClass {
        course_id: class.course_id,
        lecturer_id,
        lecturer_name,
        class_name: class.class_name.trim().to_string(),
        academic_year: class.academic_year.trim().to_string(),
        semester_period: class.semester_period,
        max_students,
        schedule: class.schedule,
        room: class.room,
        status: ClassStatus::Active,
    };

    match storage.create_course_class(new_class).await {
        Ok(created) => {
            info!("Class {} created by {}", created.class_name, user.user_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(created, "Kelas berhasil dibuat")))
        }
        Err(e) => Ok(server_error("Gagal membuat kelas", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::SemesterPeriod;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{class_with_schedule, slot, storage, user};
    use actix_web::http::StatusCode;

    fn request(course_id: i64, schedule: Vec<ScheduleSlot>) -> CreateClassRequest {
        CreateClassRequest {
            course_id,
            lecturer_id: None,
            lecturer_name: None,
            class_name: "TI-2B".to_string(),
            academic_year: "2025/2026".to_string(),
            semester_period: SemesterPeriod::Ganjil,
            max_students: None,
            schedule,
            room: Some("Lab 2".to_string()),
        }
    }

    #[test]
    fn test_validate_schedule() {
        assert!(validate_schedule(&[slot("Senin", "08:00", "10:00")]).is_ok());
        assert!(validate_schedule(&[slot("Monday", "08:00", "10:00")]).is_err());
        assert!(validate_schedule(&[slot("Senin", "10:00", "08:00")]).is_err());
        assert!(validate_schedule(&[
            slot("Senin", "08:00", "10:00"),
            slot("Senin", "09:00", "11:00"),
        ])
        .is_err());
        assert!(validate_schedule(&[
            slot("Senin", "08:00", "10:00"),
            slot("Senin", "10:00", "12:00"),
        ])
        .is_ok());
    }

    #[actix_web::test]
    async fn test_lecturer_schedule_conflict() {
        let raw = storage().await;
        let lecturer = user(&raw, "198703152015041001", UserRole::Lecturer).await;
        let existing =
            class_with_schedule(&raw, "TI101", Some(lecturer.id), vec![slot("Senin", "08:00", "10:00")])
                .await;
        let storage = shared(raw);
        let req = request_as(&storage, Some(&lecturer));
        let service = CourseService::new_lazy();

        let resp = create_class(
            &service,
            request(existing.course_id, vec![slot("Senin", "09:00", "11:00")]),
            &req,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = create_class(
            &service,
            request(existing.course_id, vec![slot("Selasa", "09:00", "11:00")]),
            &req,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["lecturer_id"], lecturer.id);
        assert_eq!(body["data"]["max_students"], DEFAULT_MAX_STUDENTS);
    }

    #[actix_web::test]
    async fn test_lecturer_cannot_assign_other_lecturer() {
        let raw = storage().await;
        let lecturer = user(&raw, "198703152015041001", UserRole::Lecturer).await;
        let other = user(&raw, "198703152015041002", UserRole::Lecturer).await;
        let existing = class_with_schedule(&raw, "TI101", None, vec![]).await;
        let storage = shared(raw);
        let req = request_as(&storage, Some(&lecturer));

        let mut body = request(existing.course_id, vec![]);
        body.lecturer_id = Some(other.id);
        let resp = create_class(&CourseService::new_lazy(), body, &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}

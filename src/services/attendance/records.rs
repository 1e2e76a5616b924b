use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AttendanceService, load_managed_session};
use crate::models::attendance::requests::UpdateAttendanceRequest;
use crate::models::attendance::responses::{
    AttendanceRecordResponse, SessionAttendanceListResponse,
};
use crate::models::{ApiResponse, ErrorCode, PaginationQuery};
use crate::services::{current_user, server_error};

pub async fn session_records(
    service: &AttendanceService,
    session_id: i64,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let (session, _) = match load_managed_session(&storage, &user, session_id).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };

    match storage.list_session_attendances(session_id, query).await {
        Ok((items, pagination)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SessionAttendanceListResponse {
                session,
                items,
                pagination,
            },
            "Data kehadiran sesi berhasil diambil",
        ))),
        Err(e) => Ok(server_error("Gagal mengambil data kehadiran sesi", e)),
    }
}

pub async fn update_record(
    service: &AttendanceService,
    attendance_id: i64,
    update: UpdateAttendanceRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let not_found = || {
        HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AttendanceNotFound,
            "Data kehadiran tidak ditemukan",
        ))
    };

    let attendance = match storage.get_attendance_by_id(attendance_id).await {
        Ok(Some(attendance)) => attendance,
        Ok(None) => return Ok(not_found()),
        Err(e) => return Ok(server_error("Gagal memperbarui status kehadiran", e)),
    };
    if let Err(resp) = load_managed_session(&storage, &user, attendance.session_id).await {
        return Ok(resp);
    }

    match storage
        .update_attendance(attendance_id, update.status, update.notes, user.id)
        .await
    {
        Ok(Some(attendance)) => {
            info!(
                "Attendance {} set to {} by {}",
                attendance_id, attendance.status, user.user_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                AttendanceRecordResponse { attendance },
                "Status kehadiran berhasil diperbarui",
            )))
        }
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(server_error("Gagal memperbarui status kehadiran", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::{AttendanceMethod, AttendanceStatus};
    use crate::models::attendance::requests::NewStudentAttendance;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{
        class_with_schedule, new_session, storage, user,
    };
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_update_record_sets_verifier() {
        let raw = storage().await;
        let lecturer = user(&raw, "198703152015041001", UserRole::Lecturer).await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let class = class_with_schedule(&raw, "TI101", Some(lecturer.id), vec![]).await;
        let session = raw
            .create_session_impl(new_session(class.id, "2025-06-02", "08:00", "10:00"))
            .await
            .unwrap();
        let record = raw
            .create_attendance_impl(NewStudentAttendance {
                session_id: session.id,
                student_id: student.id,
                status: AttendanceStatus::Absent,
                check_in_time: None,
                attendance_method: AttendanceMethod::Manual,
                confidence_score: None,
                notes: None,
            })
            .await
            .unwrap();
        let storage = shared(raw);
        let req = request_as(&storage, Some(&lecturer));
        let service = AttendanceService::new_lazy();

        let resp = update_record(
            &service,
            record.id,
            UpdateAttendanceRequest {
                status: AttendanceStatus::Sick,
                notes: Some("Surat dokter".to_string()),
            },
            &req,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["attendance"]["status"], "sick");
        assert_eq!(body["data"]["attendance"]["verified_by"], lecturer.id);

        let resp = session_records(&service, session.id, PaginationQuery::default(), &req)
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["data"]["items"][0]["student_user_id"], "220211060001");

        let resp = update_record(
            &service,
            record.id + 100,
            UpdateAttendanceRequest {
                status: AttendanceStatus::Present,
                notes: None,
            },
            &req,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

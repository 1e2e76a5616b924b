use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Duration, FixedOffset};
use std::sync::Arc;
use tracing::{info, warn};

use super::{AttendanceService, load_managed_session};
use crate::config::AppConfig;
use crate::models::attendance::entities::{
    AttendanceMethod, AttendanceSession, AttendanceStatus, RecognitionStatus, SessionStatus,
};
use crate::models::attendance::requests::{
    NewFaceRecognitionLog, NewStudentAttendance, RecordAttendanceRequest,
    RecordFaceAttendanceRequest,
};
use crate::models::attendance::responses::{AttendanceRecordResponse, FaceAttendanceResponse};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::system::DynamicConfig;
use crate::services::{current_user, server_error};
use crate::storage::Storage;
use crate::utils::schedule::{parse_clock, parse_date};

/// 超过开课时间加迟到阈值即为迟到；课次时间无法解析时按出席处理
pub(crate) fn status_for_check_in(
    now: DateTime<FixedOffset>,
    session: &AttendanceSession,
    late_threshold_minutes: i64,
) -> AttendanceStatus {
    let start = parse_date(&session.session_date)
        .and_then(|date| Ok(date.and_time(parse_clock(&session.start_time)?)))
        .ok()
        .and_then(|naive| naive.and_local_timezone(*now.offset()).single());

    match start {
        Some(start) if now > start + Duration::minutes(late_threshold_minutes) => {
            AttendanceStatus::Late
        }
        _ => AttendanceStatus::Present,
    }
}

fn session_inactive() -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::SessionStateInvalid,
        "Sesi kehadiran tidak aktif",
    ))
}

fn already_recorded() -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::AttendanceAlreadyRecorded,
        "Kehadiran mahasiswa sudah tercatat untuk sesi ini",
    ))
}

/// 学生存在且角色为学生，并且本课次尚未记录
async fn check_student(
    storage: &Arc<dyn Storage>,
    session_id: i64,
    student_id: i64,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_id(student_id).await {
        Ok(Some(student)) if student.role == UserRole::Student => Ok(()),
        Ok(_) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StudentNotFound,
            "Mahasiswa tidak ditemukan",
        ))),
        Err(e) => Err(server_error("Gagal mencatat kehadiran", e)),
    }?;

    match storage.find_attendance(session_id, student_id).await {
        Ok(Some(_)) => Err(already_recorded()),
        Ok(None) => Ok(()),
        Err(e) => Err(server_error("Gagal mencatat kehadiran", e)),
    }
}

pub async fn record_attendance(
    service: &AttendanceService,
    record: RecordAttendanceRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let (session, _) = match load_managed_session(&storage, &user, record.session_id).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };
    if session.status != SessionStatus::Ongoing {
        return Ok(session_inactive());
    }
    if let Err(resp) = check_student(&storage, session.id, record.student_id).await {
        return Ok(resp);
    }

    let check_in_time = record
        .status
        .counts_as_attended()
        .then(|| chrono::Utc::now().timestamp());

    let new_record = NewStudentAttendance {
        session_id: session.id,
        student_id: record.student_id,
        status: record.status,
        check_in_time,
        attendance_method: AttendanceMethod::Manual,
        confidence_score: None,
        notes: record.notes,
    };

    match storage.create_attendance(new_record).await {
        Ok(attendance) => {
            info!(
                "Attendance {} recorded for student {} in session {}",
                attendance.status, attendance.student_id, attendance.session_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                AttendanceRecordResponse { attendance },
                "Kehadiran berhasil dicatat",
            )))
        }
        Err(e) => Ok(server_error("Gagal mencatat kehadiran", e)),
    }
}

pub async fn record_face_attendance(
    service: &AttendanceService,
    record: RecordFaceAttendanceRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;

    if !(0.0..=1.0).contains(&record.confidence_score) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Confidence score harus antara 0 dan 1",
        )));
    }

    let storage = service.get_storage(request)?;

    let (session, _) = match load_managed_session(&storage, &user, record.session_id).await {
        Ok(found) => found,
        Err(resp) => return Ok(resp),
    };
    if session.status != SessionStatus::Ongoing {
        return Ok(session_inactive());
    }

    match storage.get_user_by_id(record.student_id).await {
        Ok(Some(student)) if student.role == UserRole::Student => {}
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::StudentNotFound,
                "Mahasiswa tidak ditemukan",
            )));
        }
        Err(e) => return Ok(server_error("Gagal mencatat kehadiran", e)),
    }

    let face_log = |status: RecognitionStatus| NewFaceRecognitionLog {
        session_id: Some(session.id),
        recognized_user_id: Some(record.student_id),
        confidence_score: Some(record.confidence_score),
        captured_image_path: record.captured_image_path.clone(),
        recognition_status: status,
        processing_time_ms: record.processing_time_ms,
        camera_id: record.camera_id.clone(),
    };

    let min_confidence = DynamicConfig::min_confidence_score().await;
    if record.confidence_score < min_confidence {
        warn!(
            "Low confidence {:.4} (< {}) for student {} in session {}",
            record.confidence_score, min_confidence, record.student_id, session.id
        );
        if let Err(e) = storage
            .create_face_log(face_log(RecognitionStatus::LowConfidence))
            .await
        {
            return Ok(server_error("Gagal mencatat log pengenalan wajah", e));
        }
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::LowConfidence,
            "Confidence score terlalu rendah untuk verifikasi wajah",
        )));
    }

    match storage.find_attendance(session.id, record.student_id).await {
        Ok(Some(_)) => return Ok(already_recorded()),
        Ok(None) => {}
        Err(e) => return Ok(server_error("Gagal mencatat kehadiran", e)),
    }

    let now = AppConfig::get().campus_now();
    let late_threshold = DynamicConfig::late_threshold_minutes().await;
    let status = status_for_check_in(now, &session, late_threshold);

    let new_record = NewStudentAttendance {
        session_id: session.id,
        student_id: record.student_id,
        status,
        check_in_time: Some(now.timestamp()),
        attendance_method: AttendanceMethod::FaceRecognition,
        confidence_score: Some(record.confidence_score),
        notes: None,
    };
    let attendance = match storage.create_attendance(new_record).await {
        Ok(attendance) => attendance,
        Err(e) => return Ok(server_error("Gagal mencatat kehadiran melalui pengenalan wajah", e)),
    };

    let recognition_log = match storage
        .create_face_log(face_log(RecognitionStatus::Success))
        .await
    {
        Ok(log) => log,
        Err(e) => return Ok(server_error("Gagal mencatat log pengenalan wajah", e)),
    };

    info!(
        "Face attendance {} for student {} in session {} (confidence {:.4})",
        attendance.status, attendance.student_id, session.id, record.confidence_score
    );
    Ok(HttpResponse::Created().json(ApiResponse::success(
        FaceAttendanceResponse {
            attendance,
            recognition_log,
        },
        "Kehadiran berhasil dicatat melalui pengenalan wajah",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{
        class_with_schedule, new_session, storage, user,
    };
    use actix_web::http::StatusCode;
    use chrono::TimeZone;

    fn session_at(date: &str, start: &str) -> AttendanceSession {
        let now = chrono::Utc::now();
        AttendanceSession {
            id: 1,
            class_id: 1,
            session_number: 1,
            session_date: date.to_string(),
            start_time: start.to_string(),
            end_time: "23:59".to_string(),
            topic: None,
            session_type: crate::models::attendance::entities::SessionType::Lecture,
            attendance_method: AttendanceMethod::FaceRecognition,
            status: SessionStatus::Ongoing,
            notes: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_for_check_in() {
        let wita = FixedOffset::east_opt(8 * 3600).unwrap();
        let session = session_at("2025-06-02", "08:00");

        let on_time = wita.with_ymd_and_hms(2025, 6, 2, 8, 10, 0).unwrap();
        assert_eq!(status_for_check_in(on_time, &session, 15), AttendanceStatus::Present);

        let boundary = wita.with_ymd_and_hms(2025, 6, 2, 8, 15, 0).unwrap();
        assert_eq!(status_for_check_in(boundary, &session, 15), AttendanceStatus::Present);

        let late = wita.with_ymd_and_hms(2025, 6, 2, 8, 16, 0).unwrap();
        assert_eq!(status_for_check_in(late, &session, 15), AttendanceStatus::Late);

        let broken = session_at("not-a-date", "08:00");
        assert_eq!(status_for_check_in(late, &broken, 15), AttendanceStatus::Present);
    }

    #[actix_web::test]
    async fn test_manual_record_requires_ongoing_session() {
        let raw = storage().await;
        let lecturer = user(&raw, "198703152015041001", UserRole::Lecturer).await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let class = class_with_schedule(&raw, "TI101", Some(lecturer.id), vec![]).await;
        let session = raw
            .create_session_impl(new_session(class.id, "2025-06-02", "08:00", "10:00"))
            .await
            .unwrap();
        let storage = shared(raw);
        let req = request_as(&storage, Some(&lecturer));
        let service = AttendanceService::new_lazy();

        let record = || RecordAttendanceRequest {
            session_id: session.id,
            student_id: student.id,
            status: AttendanceStatus::Present,
            notes: None,
        };

        let resp = record_attendance(&service, record(), &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        storage
            .update_session_status(session.id, SessionStatus::Ongoing)
            .await
            .unwrap();
        let resp = record_attendance(&service, record(), &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["attendance"]["status"], "present");
        assert!(body["data"]["attendance"]["check_in_time"].is_string());

        let resp = record_attendance(&service, record(), &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_face_record_confidence() {
        let raw = storage().await;
        let lecturer = user(&raw, "198703152015041001", UserRole::Lecturer).await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let class = class_with_schedule(&raw, "TI101", Some(lecturer.id), vec![]).await;
        let session = raw
            .create_session_impl(new_session(class.id, "2025-06-02", "08:00", "10:00"))
            .await
            .unwrap();
        raw.update_session_status_impl(session.id, SessionStatus::Ongoing)
            .await
            .unwrap();
        let storage = shared(raw);
        let req = request_as(&storage, Some(&lecturer));
        let service = AttendanceService::new_lazy();

        let face = |score: f64| RecordFaceAttendanceRequest {
            session_id: session.id,
            student_id: student.id,
            confidence_score: score,
            camera_id: Some("camera_1".to_string()),
            captured_image_path: None,
            processing_time_ms: Some(150),
        };

        let resp = record_face_attendance(&service, face(0.42), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["code"], ErrorCode::LowConfidence.code());

        let resp = record_face_attendance(&service, face(1.5), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = record_face_attendance(&service, face(0.95), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        // 课次日期已过，签到一定迟到
        assert_eq!(body["data"]["attendance"]["status"], "late");
        assert_eq!(body["data"]["attendance"]["attendance_method"], "face_recognition");
        assert_eq!(body["data"]["recognition_log"]["recognition_status"], "success");

        let resp = record_face_attendance(&service, face(0.95), &req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}

//! insert-test-attendance：给课次写入一组演示记录

use crate::errors::{Result, SiAbsensiError};
use crate::models::PaginationQuery;
use crate::models::attendance::entities::{
    AttendanceMethod, AttendanceStatus, RecognitionStatus, StudentAttendance,
};
use crate::models::attendance::requests::{NewFaceRecognitionLog, NewStudentAttendance};
use crate::models::courses::entities::EnrollmentStatus;
use crate::storage::Storage;

/// 依次分配给前三名在读学生：(状态, 方式, 置信度, 签到偏移秒)
const PLAN: [(AttendanceStatus, AttendanceMethod, Option<f64>, Option<i64>); 3] = [
    (
        AttendanceStatus::Present,
        AttendanceMethod::FaceRecognition,
        Some(0.8942),
        Some(0),
    ),
    (
        AttendanceStatus::Late,
        AttendanceMethod::FaceRecognition,
        Some(0.7834),
        Some(5 * 60),
    ),
    (AttendanceStatus::Absent, AttendanceMethod::Manual, None, None),
];

const CAMERA_ID: &str = "camera_1";
const PROCESSING_TIME_MS: i32 = 150;

pub async fn insert_test_attendance(
    storage: &dyn Storage,
    session_id: i64,
) -> Result<Vec<StudentAttendance>> {
    let session = storage
        .get_session_by_id(session_id)
        .await?
        .ok_or_else(|| SiAbsensiError::not_found(format!("课次不存在: {session_id}")))?;

    let students: Vec<i64> = storage
        .list_class_enrollments(session.class_id)
        .await?
        .into_iter()
        .filter(|e| e.enrollment.status == EnrollmentStatus::Enrolled)
        .map(|e| e.enrollment.student_id)
        .take(PLAN.len())
        .collect();
    if students.is_empty() {
        return Err(SiAbsensiError::validation(format!(
            "班级 {} 没有在读学生",
            session.class_id
        )));
    }

    let now = chrono::Utc::now().timestamp();
    let mut inserted = Vec::with_capacity(students.len());
    for (student_id, (status, method, confidence, offset)) in students.iter().zip(PLAN) {
        let record = storage
            .create_attendance(NewStudentAttendance {
                session_id,
                student_id: *student_id,
                status,
                check_in_time: offset.map(|secs| now + secs),
                attendance_method: method,
                confidence_score: confidence,
                notes: None,
            })
            .await?;
        inserted.push(record);
    }

    // 第一名学生的识别日志
    storage
        .create_face_log(NewFaceRecognitionLog {
            session_id: Some(session_id),
            recognized_user_id: Some(students[0]),
            confidence_score: PLAN[0].2,
            captured_image_path: None,
            recognition_status: RecognitionStatus::Success,
            processing_time_ms: Some(PROCESSING_TIME_MS),
            camera_id: Some(CAMERA_ID.to_string()),
        })
        .await?;

    Ok(inserted)
}

pub async fn run(storage: &dyn Storage, session_id: i64) -> Result<()> {
    let inserted = insert_test_attendance(storage, session_id).await?;
    if inserted.len() < PLAN.len() {
        tracing::warn!(
            "Only {} enrolled students found, expected {}",
            inserted.len(),
            PLAN.len()
        );
    }

    let (records, _) = storage
        .list_session_attendances(session_id, PaginationQuery::default())
        .await?;
    println!("Data kehadiran sesi {session_id}:");
    for detail in records {
        println!(
            "  {:<14} {:<24} {:<8} {}",
            detail.student_user_id,
            detail.student_name,
            detail.record.status,
            detail
                .record
                .confidence_score
                .map(|c| format!("{c:.4}"))
                .unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{
        class_with_schedule, new_session, slot, storage, user,
    };
    use crate::models::users::entities::UserRole;

    async fn session_with_students(storage: &SeaOrmStorage, students: usize) -> i64 {
        let class = class_with_schedule(
            storage,
            "TI101",
            None,
            vec![slot("Senin", "08:00", "10:00")],
        )
        .await;
        for i in 0..students {
            let student = user(storage, &format!("22021106000{i}"), UserRole::Student).await;
            storage
                .create_enrollment_impl(student.id, class.id)
                .await
                .unwrap();
        }
        storage
            .create_session_impl(new_session(class.id, "2025-09-01", "08:00", "10:00"))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_inserts_present_late_absent() {
        let raw = storage().await;
        // 只有两名学生，缺席那条不会写入
        let session_id = session_with_students(&raw, 2).await;
        let inserted = insert_test_attendance(&raw, session_id).await.unwrap();

        assert_eq!(inserted.len(), 2);
        assert_eq!(inserted[0].status, AttendanceStatus::Present);
        assert_eq!(inserted[0].confidence_score, Some(0.8942));
        assert_eq!(inserted[1].status, AttendanceStatus::Late);
        let first = inserted[0].check_in_time.unwrap();
        let second = inserted[1].check_in_time.unwrap();
        assert_eq!((second - first).num_seconds(), 300);
    }

    #[tokio::test]
    async fn test_missing_session_or_students() {
        let raw = storage().await;
        assert!(insert_test_attendance(&raw, 999).await.is_err());

        let session_id = session_with_students(&raw, 0).await;
        assert!(insert_test_attendance(&raw, session_id).await.is_err());
    }
}

use serde::{Deserialize, Serialize};

use crate::models::common::define_string_enum;

define_string_enum! {
    /// 课次状态：scheduled -> ongoing -> completed，任意未结束状态可取消
    pub enum SessionStatus {
        Scheduled => "scheduled",
        Ongoing => "ongoing" | "active",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

define_string_enum! {
    pub enum SessionType {
        Lecture => "lecture",
        Practicum => "practicum",
        Exam => "exam",
        Other => "other",
    }
}

define_string_enum! {
    pub enum AttendanceMethod {
        FaceRecognition => "face_recognition",
        QrCode => "qr_code",
        Manual => "manual",
        Mixed => "mixed",
    }
}

define_string_enum! {
    pub enum AttendanceStatus {
        Present => "present",
        Absent => "absent",
        Late => "late",
        Excused => "excused",
        Sick => "sick",
    }
}

impl AttendanceStatus {
    /// 出席和迟到都计入出勤率
    pub fn counts_as_attended(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

define_string_enum! {
    pub enum RecognitionStatus {
        Success => "success",
        Failed => "failed",
        LowConfidence => "low_confidence",
        NoFaceDetected => "no_face_detected",
    }
}

// 考勤课次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSession {
    pub id: i64,
    pub class_id: i64,
    pub session_number: i32,
    /// YYYY-MM-DD
    pub session_date: String,
    /// HH:MM
    pub start_time: String,
    pub end_time: String,
    pub topic: Option<String>,
    pub session_type: SessionType,
    pub attendance_method: AttendanceMethod,
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 学生考勤记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAttendance {
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub check_in_time: Option<chrono::DateTime<chrono::Utc>>,
    pub check_out_time: Option<chrono::DateTime<chrono::Utc>>,
    pub attendance_method: AttendanceMethod,
    pub confidence_score: Option<f64>,
    pub notes: Option<String>,
    pub verified_by: Option<i64>,
    pub verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 人脸识别日志
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceRecognitionLog {
    pub id: i64,
    pub session_id: Option<i64>,
    pub recognized_user_id: Option<i64>,
    pub confidence_score: Option<f64>,
    pub captured_image_path: Option<String>,
    pub recognition_status: RecognitionStatus,
    pub processing_time_ms: Option<i32>,
    pub camera_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

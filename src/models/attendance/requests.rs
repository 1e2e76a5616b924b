use serde::Deserialize;

use super::entities::{
    AttendanceMethod, AttendanceStatus, RecognitionStatus, SessionStatus, SessionType,
};
use crate::models::common::PaginationQuery;

// 创建课次请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(alias = "course_class_id")]
    pub class_id: i64,
    pub session_date: String,
    pub start_time: String,
    pub end_time: String,
    pub topic: Option<String>,
    pub session_type: Option<SessionType>,
    pub attendance_method: Option<AttendanceMethod>,
    pub notes: Option<String>,
}

/// 存储层使用的课次创建参数
#[derive(Debug, Clone)]
pub struct NewAttendanceSession {
    pub class_id: i64,
    pub session_date: String,
    pub start_time: String,
    pub end_time: String,
    pub topic: Option<String>,
    pub session_type: SessionType,
    pub attendance_method: AttendanceMethod,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
}

// 手动记录考勤
#[derive(Debug, Clone, Deserialize)]
pub struct RecordAttendanceRequest {
    pub session_id: i64,
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

// 人脸识别考勤
#[derive(Debug, Clone, Deserialize)]
pub struct RecordFaceAttendanceRequest {
    pub session_id: i64,
    pub student_id: i64,
    pub confidence_score: f64,
    pub camera_id: Option<String>,
    pub captured_image_path: Option<String>,
    pub processing_time_ms: Option<i32>,
}

/// 存储层使用的考勤写入参数
#[derive(Debug, Clone)]
pub struct NewStudentAttendance {
    pub session_id: i64,
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub check_in_time: Option<i64>,
    pub attendance_method: AttendanceMethod,
    pub confidence_score: Option<f64>,
    pub notes: Option<String>,
}

/// 存储层使用的人脸日志写入参数
#[derive(Debug, Clone)]
pub struct NewFaceRecognitionLog {
    pub session_id: Option<i64>,
    pub recognized_user_id: Option<i64>,
    pub confidence_score: Option<f64>,
    pub captured_image_path: Option<String>,
    pub recognition_status: RecognitionStatus,
    pub processing_time_ms: Option<i32>,
    pub camera_id: Option<String>,
}

// 修改考勤状态
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAttendanceRequest {
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

// 门禁检查请求（设备调用，无需登录）
#[derive(Debug, Clone, Deserialize)]
pub struct CheckAccessRequest {
    pub user_id: i64,
    pub date: Option<String>,
    pub confidence_score: Option<f64>,
}

// 管理员考勤历史查询
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceHistoryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::models::common::deserialize_option_from_str")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::deserialize_option_from_str")]
    pub class_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::deserialize_option_from_str")]
    pub student_id: Option<i64>,
    pub status: Option<AttendanceStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// 课次列表查询
#[derive(Debug, Clone, Deserialize)]
pub struct SessionListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<SessionStatus>,
}

/// 存储层课次查询条件，日期为闭区间 `YYYY-MM-DD`
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub class_ids: Option<Vec<i64>>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub statuses: Vec<SessionStatus>,
}

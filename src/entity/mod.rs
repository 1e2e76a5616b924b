//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod attendance_sessions;
pub mod course_classes;
pub mod courses;
pub mod door_access_logs;
pub mod face_recognition_logs;
pub mod notifications;
pub mod student_attendances;
pub mod student_enrollments;
pub mod system_settings;
pub mod users;

/// 秒级时间戳转 UTC 时间
pub(crate) fn ts(seconds: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::<chrono::Utc>::from_timestamp(seconds, 0).unwrap_or_default()
}

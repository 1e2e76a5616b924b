use serde::{Deserialize, Serialize};

use crate::models::common::define_string_enum;

define_string_enum! {
    pub enum NotificationType {
        Attendance => "attendance",
        Course => "course",
        System => "system",
        Announcement => "announcement",
        Reminder => "reminder",
    }
}

// 通知实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

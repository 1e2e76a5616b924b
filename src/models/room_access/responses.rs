use serde::Serialize;

use super::entities::DoorAccessLog;
use crate::models::common::PaginationInfo;
use crate::models::courses::entities::{ClassStatus, ScheduleSlot};

/// 班级门禁概况
#[derive(Debug, Clone, Serialize)]
pub struct ClassRoomAccess {
    pub class_id: i64,
    pub class_name: String,
    pub course_code: String,
    pub course_name: String,
    pub lecturer_name: Option<String>,
    pub room: Option<String>,
    pub status: ClassStatus,
    pub access_active: bool,
    pub enrolled_count: u64,
    /// 今天出席 + 迟到的人数
    pub today_access: u64,
    /// HH:MM
    pub last_access: Option<String>,
    pub today_schedule: Vec<ScheduleSlot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoomAccessTotals {
    pub total_classes: u64,
    pub active_classes: u64,
    pub total_access: u64,
}

#[derive(Debug, Serialize)]
pub struct RoomAccessListResponse {
    pub items: Vec<ClassRoomAccess>,
    pub totals: RoomAccessTotals,
}

/// 模拟的门禁设备状态
#[derive(Debug, Clone, Serialize)]
pub struct DoorStatusResponse {
    pub locked: bool,
    pub online: bool,
    pub device_model: String,
    pub location: String,
    pub connection: String,
    pub battery_level: u8,
    pub last_access: Option<chrono::DateTime<chrono::Utc>>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct ClassAccessDetailResponse {
    pub class: ClassRoomAccess,
    pub recent_logs: Vec<DoorAccessLog>,
}

#[derive(Debug, Serialize)]
pub struct DoorAccessLogListResponse {
    pub items: Vec<DoorAccessLog>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize)]
pub struct AccessChangeResponse {
    pub class_id: i64,
    pub status: ClassStatus,
    /// 撤销权限时被提前结束的课次数
    pub sessions_closed: u64,
}

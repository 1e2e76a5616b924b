use serde::Serialize;

use crate::models::attendance::entities::{AttendanceSession, AttendanceStatus};
use crate::models::attendance::responses::StatusCounts;
use crate::models::common::define_string_enum;
use crate::models::courses::entities::ScheduleSlot;
use crate::models::courses::responses::CourseClassDetail;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemOverview {
    pub total_users: u64,
    pub total_students: u64,
    pub total_lecturers: u64,
    pub total_courses: u64,
    pub total_classes: u64,
    pub active_sessions: u64,
    pub today_attendances: u64,
    pub unread_notifications: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveCourse {
    pub course_id: i64,
    pub course_code: String,
    pub course_name: String,
    pub session_count: u64,
}

#[derive(Debug, Serialize)]
pub struct SuperAdminDashboardResponse {
    pub overview: SystemOverview,
    /// 本月按状态统计
    pub attendance_statistics: StatusCounts,
    pub active_courses: Vec<ActiveCourse>,
}

/// 课次及所属班级信息
#[derive(Debug, Clone, Serialize)]
pub struct SessionWithClass {
    #[serde(flatten)]
    pub session: AttendanceSession,
    pub class_name: String,
    pub course_code: String,
    pub course_name: String,
}

#[derive(Debug, Serialize)]
pub struct LecturerDashboardResponse {
    pub classes: Vec<CourseClassDetail>,
    pub total_students: u64,
    pub today_sessions: Vec<SessionWithClass>,
    pub ongoing_sessions: Vec<SessionWithClass>,
    /// 本周（周日起）按状态统计
    pub week_statistics: StatusCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayClass {
    pub class_id: i64,
    pub class_name: String,
    pub course_code: String,
    pub course_name: String,
    pub room: Option<String>,
    pub slot: ScheduleSlot,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentAttendance {
    pub session_id: i64,
    pub session_date: String,
    pub course_name: String,
    pub class_name: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Serialize)]
pub struct StudentDashboardResponse {
    pub enrolled_classes: Vec<CourseClassDetail>,
    /// 今天的印尼语星期名
    pub today: String,
    pub today_schedule: Vec<TodayClass>,
    pub recent_attendance: Vec<RecentAttendance>,
    pub counts: StatusCounts,
    pub attendance_percentage: f64,
}

define_string_enum! {
    /// 日历格子状态
    pub enum CalendarDayStatus {
        Present => "present",
        Absent => "absent",
        Late => "late",
        NoClass => "no_class",
    }
}

impl CalendarDayStatus {
    /// 页面上显示的印尼语标签
    pub fn label(&self) -> &'static str {
        match self {
            CalendarDayStatus::Present => "Hadir",
            CalendarDayStatus::Absent => "Tidak Hadir",
            CalendarDayStatus::Late => "Terlambat",
            CalendarDayStatus::NoClass => "Tidak ada kelas",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub day: u32,
    /// YYYY-MM-DD
    pub date: String,
    pub status: CalendarDayStatus,
    pub label: String,
    pub is_today: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalendarSummary {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    /// 周日开头，前面的空格子数
    pub leading_blanks: u32,
    /// `None` 为月初前的空白格
    pub cells: Vec<Option<CalendarDay>>,
    pub summary: CalendarSummary,
}

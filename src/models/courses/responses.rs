use serde::Serialize;

use super::entities::{Course, CourseClass, Enrollment};
use crate::models::common::PaginationInfo;

// 课程响应
#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub course: Course,
}

#[derive(Debug, Serialize)]
pub struct CourseListResponse {
    pub items: Vec<Course>,
    pub pagination: PaginationInfo,
}

/// 班级及其课程信息、选课人数
#[derive(Debug, Clone, Serialize)]
pub struct CourseClassDetail {
    #[serde(flatten)]
    pub class: CourseClass,
    pub course_code: String,
    pub course_name: String,
    pub enrolled_count: u64,
}

#[derive(Debug, Serialize)]
pub struct CourseClassListResponse {
    pub course: Course,
    pub items: Vec<CourseClassDetail>,
}

/// 选课记录及学生信息
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentDetail {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub student_user_id: String,
    pub student_name: String,
    pub student_email: String,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentListResponse {
    pub class: CourseClass,
    pub items: Vec<EnrollmentDetail>,
    pub total: u64,
    pub capacity: i32,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    pub enrollment: Enrollment,
}

/// 课程管理页面中的单个班级卡片
#[derive(Debug, Clone, Serialize)]
pub struct CourseOverviewItem {
    pub class_id: i64,
    pub course_id: i64,
    pub course_code: String,
    pub course_name: String,
    pub class_name: String,
    pub lecturer_name: Option<String>,
    pub active: bool,
    pub students: u64,
    pub total_sessions: u64,
    pub completed_sessions: u64,
    /// 出勤率百分比（出席 + 迟到）
    pub average_attendance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CourseOverviewStats {
    pub total_courses: u64,
    pub total_students: u64,
    pub average_attendance: i64,
    pub completed_sessions: u64,
    pub needs_attention: u64,
}

#[derive(Debug, Serialize)]
pub struct CourseOverviewResponse {
    pub items: Vec<CourseOverviewItem>,
    pub stats: CourseOverviewStats,
}

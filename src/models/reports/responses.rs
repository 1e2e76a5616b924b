use std::collections::BTreeMap;

use serde::Serialize;

use super::requests::ReportDateRange;
use crate::models::attendance::entities::AttendanceStatus;
use crate::models::attendance::responses::StatusCounts;

#[derive(Debug, Clone, Serialize)]
pub struct ReportClassInfo {
    pub class_id: i64,
    pub class_name: String,
    pub course_code: String,
    pub course_name: String,
    pub lecturer_name: Option<String>,
    pub room: Option<String>,
    pub semester_period: String,
    pub academic_year: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSession {
    pub id: i64,
    pub session_number: i32,
    pub session_date: String,
    pub start_time: String,
    pub end_time: String,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixCell {
    pub status: AttendanceStatus,
    pub check_in_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// 考勤矩阵的一行；没有记录的课次视为缺勤
#[derive(Debug, Clone, Serialize)]
pub struct StudentMatrixRow {
    pub student_id: i64,
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub sessions: BTreeMap<i64, MatrixCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassReportStatistics {
    pub total_sessions: u64,
    pub total_students: u64,
    pub summary: StatusCounts,
    pub attendance_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct ClassAttendanceReport {
    pub class_info: ReportClassInfo,
    pub date_range: ReportDateRange,
    pub sessions: Vec<ReportSession>,
    pub attendance_matrix: Vec<StudentMatrixRow>,
    pub statistics: ClassReportStatistics,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub generated_by: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportStudentInfo {
    pub id: i64,
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub program_study: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentClassReport {
    pub class_id: i64,
    pub class_name: String,
    pub course_code: String,
    pub course_name: String,
    pub lecturer_name: Option<String>,
    pub total_sessions: u64,
    pub counts: StatusCounts,
    pub attendance_percentage: f64,
    pub below_minimum: bool,
}

#[derive(Debug, Serialize)]
pub struct StudentAttendanceReport {
    pub student: ReportStudentInfo,
    pub date_range: ReportDateRange,
    pub classes: Vec<StudentClassReport>,
    pub overall: StatusCounts,
    pub overall_percentage: f64,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LecturerClassSummary {
    pub class_id: i64,
    pub class_name: String,
    pub course_code: String,
    pub course_name: String,
    pub students: u64,
    pub total_sessions: u64,
    pub sessions_held: u64,
    pub attendance_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct LecturerAttendanceSummary {
    pub lecturer_id: i64,
    pub lecturer_name: String,
    pub classes: Vec<LecturerClassSummary>,
    pub total_classes: u64,
    pub total_sessions_held: u64,
    pub average_attendance_rate: f64,
}

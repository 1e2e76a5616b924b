use std::collections::BTreeMap;

use serde::Serialize;

use super::entities::{AttendanceSession, AttendanceStatus, FaceRecognitionLog, StudentAttendance};
use crate::models::common::PaginationInfo;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: AttendanceSession,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub items: Vec<AttendanceSession>,
    pub pagination: PaginationInfo,
}

/// 考勤记录及学生信息
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecordDetail {
    #[serde(flatten)]
    pub record: StudentAttendance,
    pub student_user_id: String,
    pub student_name: String,
}

#[derive(Debug, Serialize)]
pub struct SessionAttendanceListResponse {
    pub session: AttendanceSession,
    pub items: Vec<AttendanceRecordDetail>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize)]
pub struct AttendanceRecordResponse {
    pub attendance: StudentAttendance,
}

#[derive(Debug, Serialize)]
pub struct FaceAttendanceResponse {
    pub attendance: StudentAttendance,
    pub recognition_log: FaceRecognitionLog,
}

/// 按状态统计的次数
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub present: u64,
    pub absent: u64,
    pub late: u64,
    pub excused: u64,
    pub sick: u64,
}

impl StatusCounts {
    pub fn add(&mut self, status: AttendanceStatus) {
        self.add_many(status, 1);
    }

    pub fn add_many(&mut self, status: AttendanceStatus, count: u64) {
        match status {
            AttendanceStatus::Present => self.present += count,
            AttendanceStatus::Absent => self.absent += count,
            AttendanceStatus::Late => self.late += count,
            AttendanceStatus::Excused => self.excused += count,
            AttendanceStatus::Sick => self.sick += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.present + self.absent + self.late + self.excused + self.sick
    }

    pub fn attended(&self) -> u64 {
        self.present + self.late
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentAttendanceStatistic {
    pub student_id: i64,
    pub student_user_id: String,
    pub student_name: String,
    pub counts: StatusCounts,
    pub attendance_percentage: f64,
    pub below_minimum: bool,
}

#[derive(Debug, Serialize)]
pub struct AttendanceStatisticsResponse {
    pub class_id: i64,
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub counts: StatusCounts,
    pub attendance_rate: f64,
    pub students: Vec<StudentAttendanceStatistic>,
}

/// 门禁检查时返回的可进入课次
#[derive(Debug, Clone, Serialize)]
pub struct AccessibleSession {
    pub session_id: i64,
    pub session_date: String,
    pub start_time: String,
    pub end_time: String,
    pub topic: Option<String>,
    pub class_name: String,
    pub course_name: String,
}

#[derive(Debug, Serialize)]
pub struct CheckAccessResponse {
    pub allowed: bool,
    pub sessions: Vec<AccessibleSession>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceHistoryItem {
    pub id: i64,
    pub session_id: i64,
    pub session_date: String,
    pub start_time: String,
    pub class_id: i64,
    pub class_name: String,
    pub course_code: String,
    pub course_name: String,
    pub student_id: i64,
    pub student_user_id: String,
    pub student_name: String,
    pub status: AttendanceStatus,
    pub check_in_time: Option<chrono::DateTime<chrono::Utc>>,
    pub attendance_method: super::entities::AttendanceMethod,
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceHistoryResponse {
    pub items: Vec<AttendanceHistoryItem>,
    pub pagination: PaginationInfo,
    pub summary: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts() {
        let mut counts = StatusCounts::default();
        for status in [
            AttendanceStatus::Present,
            AttendanceStatus::Present,
            AttendanceStatus::Late,
            AttendanceStatus::Absent,
            AttendanceStatus::Sick,
        ] {
            counts.add(status);
        }
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.attended(), 3);
        assert_eq!(counts.excused, 0);
    }
}

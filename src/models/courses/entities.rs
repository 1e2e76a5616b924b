use serde::{Deserialize, Serialize};

use crate::models::common::define_string_enum;

define_string_enum! {
    pub enum CourseStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

define_string_enum! {
    /// 班级状态；`inactive` 表示门禁权限被收回
    pub enum ClassStatus {
        Active => "active",
        Inactive => "inactive",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

define_string_enum! {
    /// 学期（奇数/偶数学期）
    pub enum SemesterPeriod {
        Ganjil => "ganjil",
        Genap => "genap",
    }
}

define_string_enum! {
    pub enum EnrollmentStatus {
        Enrolled => "enrolled" | "active",
        Dropped => "dropped",
        Completed => "completed",
    }
}

// 课程实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub course_code: String,
    pub course_name: String,
    pub credits: i32,
    pub semester: i32,
    pub program_study: String,
    pub description: Option<String>,
    pub prerequisites: Vec<String>,
    pub status: CourseStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 每周上课时间段，`day` 使用印尼语星期名（Senin..Minggu）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

// 课程班级实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseClass {
    pub id: i64,
    pub course_id: i64,
    pub lecturer_id: Option<i64>,
    pub lecturer_name: Option<String>,
    pub class_name: String,
    pub academic_year: String,
    pub semester_period: SemesterPeriod,
    pub max_students: i32,
    pub schedule: Vec<ScheduleSlot>,
    pub room: Option<String>,
    pub status: ClassStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl CourseClass {
    /// 门禁开放条件：班级有效且排了课
    pub fn has_room_access(&self) -> bool {
        self.status == ClassStatus::Active && !self.schedule.is_empty()
    }
}

// 选课实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub enrollment_date: chrono::DateTime<chrono::Utc>,
    pub status: EnrollmentStatus,
    pub final_grade: Option<String>,
    pub final_score: Option<f64>,
}

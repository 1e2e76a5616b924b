use serde::Deserialize;

use super::entities::{ClassStatus, CourseStatus, EnrollmentStatus, ScheduleSlot, SemesterPeriod};
use crate::models::common::{PaginationQuery, define_string_enum};

// 课程列表查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct CourseListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "crate::models::common::deserialize_option_from_str")]
    pub semester: Option<i32>,
    pub program_study: Option<String>,
    pub status: Option<CourseStatus>,
}

// 课程创建请求（种子脚本也调用这个接口）
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    pub course_code: String,
    pub course_name: String,
    pub credits: i32,
    pub semester: i32,
    pub program_study: String,
    pub description: Option<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourseRequest {
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub credits: Option<i32>,
    pub semester: Option<i32>,
    pub program_study: Option<String>,
    pub description: Option<String>,
    pub prerequisites: Option<Vec<String>>,
    pub status: Option<CourseStatus>,
}

// 班级创建请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassRequest {
    pub course_id: i64,
    /// 不填时，教师创建的班级归属自己
    pub lecturer_id: Option<i64>,
    pub lecturer_name: Option<String>,
    pub class_name: String,
    pub academic_year: String,
    pub semester_period: SemesterPeriod,
    pub max_students: Option<i32>,
    #[serde(default)]
    pub schedule: Vec<ScheduleSlot>,
    pub room: Option<String>,
}

/// 存储层使用的班级创建参数（已确定教师和状态）
#[derive(Debug, Clone)]
pub struct NewCourseClass {
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
}

// 选课请求
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollRequest {
    pub class_id: i64,
    /// 学生本人选课时可省略
    pub student_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEnrollmentStatusRequest {
    pub status: EnrollmentStatus,
    pub final_grade: Option<String>,
    pub final_score: Option<f64>,
}

define_string_enum! {
    /// 课程管理页面的筛选条件
    pub enum OverviewFilter {
        All => "all",
        Active => "active",
        Attention => "attention",
        Excellent => "excellent",
    }
}

define_string_enum! {
    pub enum OverviewSort {
        Name => "name",
        Attendance => "attendance",
        Students => "students",
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseOverviewParams {
    pub filter: Option<OverviewFilter>,
    pub search: Option<String>,
    pub sort: Option<OverviewSort>,
}

/// 存储层班级查询条件，字段为空表示不限
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    pub course_id: Option<i64>,
    pub lecturer_id: Option<i64>,
    /// 只返回该学生已选（enrolled）的班级
    pub student_id: Option<i64>,
    pub statuses: Vec<ClassStatus>,
    /// 匹配课程名、课程代码或班级名
    pub search: Option<String>,
}

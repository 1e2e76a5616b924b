use serde::Deserialize;

/// 考勤日历查询参数，缺省为校园时区的当月
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// 管理员或教师查看指定学生
    pub student_id: Option<i64>,
}

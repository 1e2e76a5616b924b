use serde::{Deserialize, Serialize};

/// 报表日期区间（YYYY-MM-DD，闭区间）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportDateRange {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudentReportParams {
    #[serde(flatten)]
    pub range: ReportDateRange,
    #[serde(default, deserialize_with = "crate::models::common::deserialize_option_from_str")]
    pub course_id: Option<i64>,
}

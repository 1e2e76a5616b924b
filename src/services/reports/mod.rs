//! 考勤报表
//!
//! 报表只统计已开始或已结束的课次，取消的和尚未开始的课次不计入。

pub mod class;
pub mod lecturer;
pub mod student;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::attendance::entities::SessionStatus;
use crate::models::attendance::requests::SessionFilter;
use crate::models::dashboard::responses::SessionWithClass;
use crate::models::reports::requests::{ReportDateRange, StudentReportParams};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::schedule::parse_date;

pub struct ReportService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReportService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn class_report(
        &self,
        class_id: i64,
        range: ReportDateRange,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        class::class_attendance_report(self, class_id, range, request).await
    }

    pub async fn student_report(
        &self,
        student_id: i64,
        params: StudentReportParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        student::student_attendance_report(self, student_id, params, request).await
    }

    pub async fn lecturer_summary(
        &self,
        lecturer_id: i64,
        range: ReportDateRange,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        lecturer::lecturer_attendance_summary(self, lecturer_id, range, request).await
    }
}

/// 日期格式正确且开始不晚于结束
pub(crate) fn validate_range(range: &ReportDateRange) -> Result<(), HttpResponse> {
    let bad = |msg: &str| {
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
    };
    let parse = |value: &Option<String>| match value.as_deref() {
        Some(v) => parse_date(v)
            .map(Some)
            .map_err(|_| bad("Format tanggal harus YYYY-MM-DD")),
        None => Ok(None),
    };

    let start = parse(&range.start_date)?;
    let end = parse(&range.end_date)?;
    if let (Some(start), Some(end)) = (start, end)
        && start > end
    {
        return Err(bad("Tanggal mulai tidak boleh setelah tanggal selesai"));
    }
    Ok(())
}

/// 区间内已开始或已结束的课次
pub(crate) async fn held_sessions(
    storage: &Arc<dyn Storage>,
    class_ids: Vec<i64>,
    range: &ReportDateRange,
) -> crate::errors::Result<Vec<SessionWithClass>> {
    storage
        .list_sessions(SessionFilter {
            class_ids: Some(class_ids),
            date_from: range.start_date.clone(),
            date_to: range.end_date.clone(),
            statuses: vec![SessionStatus::Ongoing, SessionStatus::Completed],
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: Option<&str>, end: Option<&str>) -> ReportDateRange {
        ReportDateRange {
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
        }
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(&range(None, None)).is_ok());
        assert!(validate_range(&range(Some("2025-06-01"), Some("2025-06-30"))).is_ok());
        assert!(validate_range(&range(Some("2025-06-30"), Some("2025-06-01"))).is_err());
        assert!(validate_range(&range(Some("01/06/2025"), None)).is_err());
    }
}

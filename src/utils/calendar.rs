//! 学生考勤月历
//!
//! 周日开头的月视图：月初之前补空格，之后每天一个格子。

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::errors::{Result, SiAbsensiError};
use crate::models::attendance::entities::AttendanceStatus;
use crate::models::dashboard::responses::{
    CalendarDay, CalendarDayStatus, CalendarResponse, CalendarSummary,
};

pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| SiAbsensiError::validation(format!("Invalid month: {year}-{month}")))?;
    Ok(next.signed_duration_since(first).num_days() as u32)
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| SiAbsensiError::validation(format!("Invalid month: {year}-{month}")))
}

/// 单条考勤状态 -> 日历状态；请假、病假按缺勤显示
pub fn day_status_of(status: AttendanceStatus) -> CalendarDayStatus {
    match status {
        AttendanceStatus::Present => CalendarDayStatus::Present,
        AttendanceStatus::Late => CalendarDayStatus::Late,
        AttendanceStatus::Absent | AttendanceStatus::Excused | AttendanceStatus::Sick => {
            CalendarDayStatus::Absent
        }
    }
}

/// 同一天多节课时取最差的状态：缺勤 > 迟到 > 出勤
pub fn merge_day_status(current: CalendarDayStatus, next: CalendarDayStatus) -> CalendarDayStatus {
    fn rank(status: CalendarDayStatus) -> u8 {
        match status {
            CalendarDayStatus::NoClass => 0,
            CalendarDayStatus::Present => 1,
            CalendarDayStatus::Late => 2,
            CalendarDayStatus::Absent => 3,
        }
    }
    if rank(next) > rank(current) {
        next
    } else {
        current
    }
}

/// 按日期汇总考勤记录
pub fn collect_day_statuses<I>(records: I) -> HashMap<NaiveDate, CalendarDayStatus>
where
    I: IntoIterator<Item = (NaiveDate, AttendanceStatus)>,
{
    let mut days = HashMap::new();
    for (date, status) in records {
        let status = day_status_of(status);
        days.entry(date)
            .and_modify(|current| *current = merge_day_status(*current, status))
            .or_insert(status);
    }
    days
}

pub fn build_month(
    year: i32,
    month: u32,
    statuses: &HashMap<NaiveDate, CalendarDayStatus>,
    today: NaiveDate,
) -> Result<CalendarResponse> {
    let first = first_of_month(year, month)?;
    let leading_blanks = first.weekday().num_days_from_sunday();
    let total_days = days_in_month(year, month)?;

    let mut cells: Vec<Option<CalendarDay>> = vec![None; leading_blanks as usize];
    let mut summary = CalendarSummary::default();

    for day in 1..=total_days {
        let date = first.with_day(day).ok_or_else(|| {
            SiAbsensiError::validation(format!("Invalid day: {year}-{month}-{day}"))
        })?;
        let status = statuses
            .get(&date)
            .copied()
            .unwrap_or(CalendarDayStatus::NoClass);
        match status {
            CalendarDayStatus::Present => summary.present += 1,
            CalendarDayStatus::Absent => summary.absent += 1,
            CalendarDayStatus::Late => summary.late += 1,
            CalendarDayStatus::NoClass => {}
        }
        cells.push(Some(CalendarDay {
            day,
            date: date.format("%Y-%m-%d").to_string(),
            status,
            label: status.label().to_string(),
            is_today: date == today,
        }));
    }

    Ok(CalendarResponse {
        year,
        month,
        month_name: MONTH_NAMES[(month - 1) as usize].to_string(),
        leading_blanks,
        cells,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2025, 6).unwrap(), 30);
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2025, 2).unwrap(), 28);
        assert_eq!(days_in_month(2025, 12).unwrap(), 31);
        assert!(days_in_month(2025, 13).is_err());
    }

    #[test]
    fn test_june_2025_grid() {
        // 2025-06-01 是星期日
        let mut statuses = HashMap::new();
        statuses.insert(date(2025, 6, 2), CalendarDayStatus::Present);
        statuses.insert(date(2025, 6, 4), CalendarDayStatus::Late);
        statuses.insert(date(2025, 6, 12), CalendarDayStatus::Absent);

        let cal = build_month(2025, 6, &statuses, date(2025, 6, 17)).unwrap();
        assert_eq!(cal.month_name, "Juni");
        assert_eq!(cal.leading_blanks, 0);
        assert_eq!(cal.cells.len(), 30);

        let cell = cal.cells[3].as_ref().unwrap();
        assert_eq!(cell.day, 4);
        assert_eq!(cell.status, CalendarDayStatus::Late);
        assert_eq!(cell.label, "Terlambat");

        let empty = cal.cells[0].as_ref().unwrap();
        assert_eq!(empty.status, CalendarDayStatus::NoClass);
        assert_eq!(empty.label, "Tidak ada kelas");

        assert!(cal.cells[16].as_ref().unwrap().is_today);
        assert_eq!(
            cal.summary,
            CalendarSummary {
                present: 1,
                absent: 1,
                late: 1
            }
        );
    }

    #[test]
    fn test_leading_blanks() {
        // 2025-05-01 是星期四
        let cal = build_month(2025, 5, &HashMap::new(), date(2025, 1, 1)).unwrap();
        assert_eq!(cal.leading_blanks, 4);
        assert!(cal.cells[..4].iter().all(Option::is_none));
        assert_eq!(cal.cells[4].as_ref().unwrap().date, "2025-05-01");
        assert_eq!(cal.cells.len(), 4 + 31);
    }

    #[test]
    fn test_collect_worst_status_wins() {
        let d = date(2025, 6, 2);
        let days = collect_day_statuses(vec![
            (d, AttendanceStatus::Present),
            (d, AttendanceStatus::Late),
            (date(2025, 6, 3), AttendanceStatus::Sick),
        ]);
        assert_eq!(days[&d], CalendarDayStatus::Late);
        assert_eq!(days[&date(2025, 6, 3)], CalendarDayStatus::Absent);
    }
}

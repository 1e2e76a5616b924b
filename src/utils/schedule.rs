//! 课表工具
//!
//! 班级课表以 JSON 文本存储：`[{"day":"Senin","start_time":"08:00","end_time":"10:00"}]`，
//! 日期名统一使用印尼语。

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use crate::errors::{Result, SiAbsensiError};
use crate::models::courses::entities::ScheduleSlot;

/// 英文星期 -> 印尼语星期
pub const DAY_MAP: [(&str, &str); 7] = [
    ("Monday", "Senin"),
    ("Tuesday", "Selasa"),
    ("Wednesday", "Rabu"),
    ("Thursday", "Kamis"),
    ("Friday", "Jumat"),
    ("Saturday", "Sabtu"),
    ("Sunday", "Minggu"),
];

pub fn english_to_indonesian(day: &str) -> Option<&'static str> {
    DAY_MAP
        .iter()
        .find(|(en, _)| en.eq_ignore_ascii_case(day))
        .map(|(_, id)| *id)
}

pub fn indonesian_to_english(day: &str) -> Option<&'static str> {
    DAY_MAP
        .iter()
        .find(|(_, id)| id.eq_ignore_ascii_case(day))
        .map(|(en, _)| *en)
}

pub fn english_day(date: NaiveDate) -> &'static str {
    DAY_MAP[date.weekday().num_days_from_monday() as usize].0
}

pub fn indonesian_day(date: NaiveDate) -> &'static str {
    DAY_MAP[date.weekday().num_days_from_monday() as usize].1
}

/// 印尼语星期名转 chrono Weekday
pub fn weekday_of(day: &str) -> Option<Weekday> {
    indonesian_to_english(day).and_then(|en| en.parse::<Weekday>().ok())
}

/// 解析 `HH:MM`，也接受数据库里常见的 `HH:MM:SS`
pub fn parse_clock(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| SiAbsensiError::validation(format!("Invalid time format: {value}")))
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| SiAbsensiError::validation(format!("Invalid date format: {value}")))
}

/// 解析课表 JSON，空串视为空课表
pub fn parse_schedule(raw: &str) -> Result<Vec<ScheduleSlot>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

pub fn serialize_schedule(slots: &[ScheduleSlot]) -> Result<String> {
    Ok(serde_json::to_string(slots)?)
}

pub fn validate_slot(slot: &ScheduleSlot) -> Result<()> {
    if indonesian_to_english(&slot.day).is_none() {
        return Err(SiAbsensiError::validation(format!(
            "Invalid day name: {}",
            slot.day
        )));
    }
    let start = parse_clock(&slot.start_time)?;
    let end = parse_clock(&slot.end_time)?;
    if start >= end {
        return Err(SiAbsensiError::validation(format!(
            "Start time must be before end time ({} - {})",
            slot.start_time, slot.end_time
        )));
    }
    Ok(())
}

/// 某天（按印尼语星期名匹配）的课表时段
pub fn slots_on(slots: &[ScheduleSlot], date: NaiveDate) -> Vec<ScheduleSlot> {
    let today = indonesian_day(date);
    slots
        .iter()
        .filter(|slot| slot.day.eq_ignore_ascii_case(today))
        .cloned()
        .collect()
}

/// 半开区间重叠判断，首尾相接不算冲突
pub fn time_ranges_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

pub fn clock_ranges_overlap(a_start: &str, a_end: &str, b_start: &str, b_end: &str) -> Result<bool> {
    Ok(time_ranges_overlap(
        parse_clock(a_start)?,
        parse_clock(a_end)?,
        parse_clock(b_start)?,
        parse_clock(b_end)?,
    ))
}

pub fn slots_conflict(a: &ScheduleSlot, b: &ScheduleSlot) -> bool {
    if !a.day.eq_ignore_ascii_case(&b.day) {
        return false;
    }
    clock_ranges_overlap(&a.start_time, &a.end_time, &b.start_time, &b.end_time).unwrap_or(false)
}

/// 返回第一对冲突的时段
pub fn find_conflict<'a>(
    wanted: &'a [ScheduleSlot],
    existing: &'a [ScheduleSlot],
) -> Option<(&'a ScheduleSlot, &'a ScheduleSlot)> {
    wanted
        .iter()
        .flat_map(|w| existing.iter().map(move |e| (w, e)))
        .find(|(w, e)| slots_conflict(w, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: &str, start: &str, end: &str) -> ScheduleSlot {
        ScheduleSlot {
            day: day.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    #[test]
    fn test_day_mapping() {
        assert_eq!(english_to_indonesian("Monday"), Some("Senin"));
        assert_eq!(english_to_indonesian("friday"), Some("Jumat"));
        assert_eq!(english_to_indonesian("Funday"), None);
        assert_eq!(indonesian_to_english("Minggu"), Some("Sunday"));
        assert_eq!(weekday_of("Rabu"), Some(Weekday::Wed));
    }

    #[test]
    fn test_indonesian_day_from_date() {
        // 2025-03-03 是星期一
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(english_day(date), "Monday");
        assert_eq!(indonesian_day(date), "Senin");
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(indonesian_day(sunday), "Minggu");
    }

    #[test]
    fn test_parse_schedule() {
        let slots =
            parse_schedule(r#"[{"day":"Senin","start_time":"08:00","end_time":"10:00"}]"#).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].day, "Senin");
        assert!(parse_schedule("").unwrap().is_empty());
        assert!(parse_schedule("null").unwrap().is_empty());
        assert!(parse_schedule("{bad").is_err());
    }

    #[test]
    fn test_validate_slot() {
        assert!(validate_slot(&slot("Senin", "08:00", "10:00")).is_ok());
        assert!(validate_slot(&slot("Monday", "08:00", "10:00")).is_err());
        assert!(validate_slot(&slot("Senin", "10:00", "08:00")).is_err());
        assert!(validate_slot(&slot("Senin", "8am", "10:00")).is_err());
    }

    #[test]
    fn test_slots_on() {
        let slots = vec![
            slot("Senin", "08:00", "10:00"),
            slot("Rabu", "13:00", "15:00"),
            slot("senin", "15:00", "16:40"),
        ];
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(slots_on(&slots, monday).len(), 2);
        let tuesday = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert!(slots_on(&slots, tuesday).is_empty());
    }

    #[test]
    fn test_conflicts() {
        let a = slot("Senin", "08:00", "10:00");
        assert!(slots_conflict(&a, &slot("Senin", "09:00", "11:00")));
        assert!(!slots_conflict(&a, &slot("Senin", "10:00", "11:00")));
        assert!(!slots_conflict(&a, &slot("Selasa", "08:00", "10:00")));

        let wanted = vec![slot("Kamis", "07:00", "08:00"), a.clone()];
        let existing = vec![slot("Senin", "07:30", "08:30")];
        let (w, e) = find_conflict(&wanted, &existing).unwrap();
        assert_eq!(w.start_time, "08:00");
        assert_eq!(e.start_time, "07:30");
    }
}

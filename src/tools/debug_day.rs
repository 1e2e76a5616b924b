//! debug-day：核对星期映射和当天课表

use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::courses::entities::ClassStatus;
use crate::models::courses::requests::ClassFilter;
use crate::models::courses::responses::CourseClassDetail;
use crate::storage::Storage;
use crate::utils::schedule::{english_day, indonesian_day, parse_date, slots_on};

/// 当天有课的班级，每个时段一行：(班级名, 课程代码, 开始, 结束)
pub fn matching_slots(
    classes: &[CourseClassDetail],
    date: NaiveDate,
) -> Vec<(String, String, String, String)> {
    let mut rows: Vec<_> = classes
        .iter()
        .flat_map(|detail| {
            slots_on(&detail.class.schedule, date)
                .into_iter()
                .map(move |slot| {
                    (
                        detail.class.class_name.clone(),
                        detail.course_code.clone(),
                        slot.start_time,
                        slot.end_time,
                    )
                })
        })
        .collect();
    rows.sort_by(|a, b| a.2.cmp(&b.2).then_with(|| a.0.cmp(&b.0)));
    rows
}

pub async fn run(storage: &dyn Storage, date: Option<&str>) -> Result<()> {
    let now = AppConfig::get().campus_now();
    let date = match date {
        Some(value) => parse_date(value)?,
        None => now.date_naive(),
    };

    println!("Tanggal            : {date}");
    println!("Hari (English)     : {}", english_day(date));
    println!("Hari (Indonesia)   : {}", indonesian_day(date));
    println!("Waktu kampus       : {}", now.format("%H:%M"));

    let classes = storage
        .list_class_details(ClassFilter {
            statuses: vec![ClassStatus::Active],
            ..Default::default()
        })
        .await?;
    let rows = matching_slots(&classes, date);
    if rows.is_empty() {
        println!("Tidak ada jadwal untuk {}", indonesian_day(date));
        return Ok(());
    }

    println!("Jadwal hari ini:");
    for (class_name, course_code, start, end) in rows {
        println!("  {start}-{end}  {course_code:<8} {class_name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support::{class_with_schedule, slot, storage};

    #[tokio::test]
    async fn test_matching_slots_for_monday() {
        let raw = storage().await;
        class_with_schedule(
            &raw,
            "TI101",
            None,
            vec![slot("Senin", "10:00", "12:00"), slot("Rabu", "08:00", "10:00")],
        )
        .await;
        class_with_schedule(&raw, "TI102", None, vec![slot("Senin", "08:00", "09:40")]).await;

        let classes = raw.list_class_details_impl(ClassFilter::default()).await.unwrap();
        // 2025-09-01 是星期一
        let monday = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let rows = matching_slots(&classes, monday);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1, "TI102");
        assert_eq!(rows[1].2, "10:00");

        let sunday = NaiveDate::from_ymd_opt(2025, 9, 7).unwrap();
        assert!(matching_slots(&classes, sunday).is_empty());
    }
}

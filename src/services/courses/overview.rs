//! 课程管理页面：班级卡片、筛选排序与汇总统计
//!
//! 统计始终基于全部班级，筛选与搜索只影响返回的卡片。

use std::cmp::Ordering;
use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::attendance::entities::{SessionStatus, StudentAttendance};
use crate::models::attendance::requests::SessionFilter;
use crate::models::courses::entities::ClassStatus;
use crate::models::courses::requests::{
    ClassFilter, CourseOverviewParams, OverviewFilter, OverviewSort,
};
use crate::models::courses::responses::{
    CourseClassDetail, CourseOverviewItem, CourseOverviewResponse, CourseOverviewStats,
};
use crate::models::dashboard::responses::SessionWithClass;
use crate::models::users::entities::UserRole;
use crate::models::ApiResponse;
use crate::services::{current_user, percentage, server_error};

const ATTENTION_BELOW: f64 = 80.0;
const EXCELLENT_FROM: f64 = 90.0;

/// 出勤率 = 已出勤人次 / (已结束课次数 × 选课人数)
pub(crate) fn build_items(
    classes: Vec<CourseClassDetail>,
    sessions: &[SessionWithClass],
    attendances: &[StudentAttendance],
) -> Vec<CourseOverviewItem> {
    let session_class: HashMap<i64, i64> = sessions
        .iter()
        .map(|s| (s.session.id, s.session.class_id))
        .collect();

    let mut attended: HashMap<i64, u64> = HashMap::new();
    for record in attendances.iter().filter(|r| r.status.counts_as_attended()) {
        if let Some(class_id) = session_class.get(&record.session_id) {
            *attended.entry(*class_id).or_default() += 1;
        }
    }

    classes
        .into_iter()
        .map(|detail| {
            let class_sessions = sessions
                .iter()
                .filter(|s| s.session.class_id == detail.class.id);
            let (total_sessions, completed_sessions) =
                class_sessions.fold((0u64, 0u64), |(total, done), s| {
                    let done = done + u64::from(s.session.status == SessionStatus::Completed);
                    (total + 1, done)
                });
            let expected = completed_sessions * detail.enrolled_count;
            let present = attended.get(&detail.class.id).copied().unwrap_or(0);

            CourseOverviewItem {
                class_id: detail.class.id,
                course_id: detail.class.course_id,
                course_code: detail.course_code,
                course_name: detail.course_name,
                class_name: detail.class.class_name,
                lecturer_name: detail.class.lecturer_name,
                active: detail.class.status == ClassStatus::Active,
                students: detail.enrolled_count,
                total_sessions,
                completed_sessions,
                average_attendance: percentage(present, expected),
            }
        })
        .collect()
}

pub(crate) fn overview_stats(items: &[CourseOverviewItem]) -> CourseOverviewStats {
    if items.is_empty() {
        return CourseOverviewStats::default();
    }
    let mean = items.iter().map(|i| i.average_attendance).sum::<f64>() / items.len() as f64;
    CourseOverviewStats {
        total_courses: items.len() as u64,
        total_students: items.iter().map(|i| i.students).sum(),
        average_attendance: mean.round() as i64,
        completed_sessions: items.iter().map(|i| i.completed_sessions).sum(),
        needs_attention: items
            .iter()
            .filter(|i| i.average_attendance < ATTENTION_BELOW)
            .count() as u64,
    }
}

pub(crate) fn filter_overview(
    items: Vec<CourseOverviewItem>,
    filter: OverviewFilter,
    search: Option<&str>,
) -> Vec<CourseOverviewItem> {
    let keyword = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    items
        .into_iter()
        .filter(|item| match filter {
            OverviewFilter::All => true,
            OverviewFilter::Active => item.active,
            OverviewFilter::Attention => item.average_attendance < ATTENTION_BELOW,
            OverviewFilter::Excellent => item.average_attendance >= EXCELLENT_FROM,
        })
        .filter(|item| match &keyword {
            Some(k) => {
                item.course_name.to_lowercase().contains(k)
                    || item.course_code.to_lowercase().contains(k)
            }
            None => true,
        })
        .collect()
}

pub(crate) fn sort_overview(items: &mut [CourseOverviewItem], sort: OverviewSort) {
    match sort {
        OverviewSort::Name => items.sort_by(|a, b| {
            a.course_name
                .to_lowercase()
                .cmp(&b.course_name.to_lowercase())
                .then_with(|| a.class_name.cmp(&b.class_name))
        }),
        OverviewSort::Attendance => items.sort_by(|a, b| {
            b.average_attendance
                .partial_cmp(&a.average_attendance)
                .unwrap_or(Ordering::Equal)
        }),
        OverviewSort::Students => items.sort_by(|a, b| b.students.cmp(&a.students)),
    }
}

pub async fn course_overview(
    service: &CourseService,
    query: CourseOverviewParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let filter = ClassFilter {
        lecturer_id: (user.role == UserRole::Lecturer).then_some(user.id),
        ..Default::default()
    };
    let classes = match storage.list_class_details(filter).await {
        Ok(classes) => classes,
        Err(e) => return Ok(server_error("Gagal mengambil data mata kuliah", e)),
    };

    let (sessions, attendances) = if classes.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let sessions = storage
            .list_sessions(SessionFilter {
                class_ids: Some(classes.iter().map(|c| c.class.id).collect()),
                ..Default::default()
            })
            .await;
        let sessions = match sessions {
            Ok(sessions) => sessions,
            Err(e) => return Ok(server_error("Gagal mengambil data sesi", e)),
        };
        let completed: Vec<i64> = sessions
            .iter()
            .filter(|s| s.session.status == SessionStatus::Completed)
            .map(|s| s.session.id)
            .collect();
        match storage.list_attendances_for_sessions(&completed).await {
            Ok(attendances) => (sessions, attendances),
            Err(e) => return Ok(server_error("Gagal mengambil data kehadiran", e)),
        }
    };

    let all = build_items(classes, &sessions, &attendances);
    let stats = overview_stats(&all);
    let mut items = filter_overview(
        all,
        query.filter.unwrap_or(OverviewFilter::All),
        query.search.as_deref(),
    );
    sort_overview(&mut items, query.sort.unwrap_or(OverviewSort::Name));

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CourseOverviewResponse { items, stats },
        "Data mata kuliah berhasil diambil",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, code: &str, students: u64, average: f64, active: bool) -> CourseOverviewItem {
        CourseOverviewItem {
            class_id: 1,
            course_id: 1,
            course_code: code.to_string(),
            course_name: name.to_string(),
            class_name: "A".to_string(),
            lecturer_name: None,
            active,
            students,
            total_sessions: 4,
            completed_sessions: 2,
            average_attendance: average,
        }
    }

    fn sample() -> Vec<CourseOverviewItem> {
        vec![
            item("Basis Data", "TI201", 30, 95.0, true),
            item("Algoritma", "TI101", 40, 70.0, true),
            item("Jaringan", "TI301", 20, 85.0, false),
        ]
    }

    #[test]
    fn test_overview_stats() {
        let stats = overview_stats(&sample());
        assert_eq!(stats.total_courses, 3);
        assert_eq!(stats.total_students, 90);
        assert_eq!(stats.average_attendance, 83);
        assert_eq!(stats.completed_sessions, 6);
        assert_eq!(stats.needs_attention, 1);
        assert_eq!(overview_stats(&[]), CourseOverviewStats::default());
    }

    #[test]
    fn test_filter_and_search() {
        let active = filter_overview(sample(), OverviewFilter::Active, None);
        assert_eq!(active.len(), 2);

        let attention = filter_overview(sample(), OverviewFilter::Attention, None);
        assert_eq!(attention[0].course_code, "TI101");

        let excellent = filter_overview(sample(), OverviewFilter::Excellent, None);
        assert_eq!(excellent[0].course_code, "TI201");

        let search = filter_overview(sample(), OverviewFilter::All, Some("ti3"));
        assert_eq!(search.len(), 1);
        assert_eq!(search[0].course_name, "Jaringan");

        let by_name = filter_overview(sample(), OverviewFilter::All, Some("BASIS"));
        assert_eq!(by_name.len(), 1);
    }

    #[test]
    fn test_sort() {
        let mut items = sample();
        sort_overview(&mut items, OverviewSort::Name);
        assert_eq!(items[0].course_name, "Algoritma");

        sort_overview(&mut items, OverviewSort::Attendance);
        assert_eq!(items[0].course_code, "TI201");

        sort_overview(&mut items, OverviewSort::Students);
        assert_eq!(items[0].students, 40);
    }
}

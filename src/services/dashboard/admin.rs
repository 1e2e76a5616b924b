use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Datelike;

use super::DashboardService;
use crate::models::ApiResponse;
use crate::models::attendance::entities::SessionStatus;
use crate::models::attendance::requests::SessionFilter;
use crate::models::courses::entities::ClassStatus;
use crate::models::courses::requests::ClassFilter;
use crate::models::courses::responses::CourseClassDetail;
use crate::models::dashboard::responses::{
    ActiveCourse, SessionWithClass, SuperAdminDashboardResponse, SystemOverview,
};
use crate::models::users::entities::UserRole;
use crate::services::{campus_today, server_error};

// 最活跃课程的数量
const ACTIVE_COURSE_LIMIT: usize = 5;

/// 按课程统计课次数，取前几名
pub(crate) fn most_active_courses(
    classes: &[CourseClassDetail],
    sessions: &[SessionWithClass],
    limit: usize,
) -> Vec<ActiveCourse> {
    let course_of: HashMap<i64, &CourseClassDetail> =
        classes.iter().map(|c| (c.class.id, c)).collect();

    let mut counted: HashMap<i64, ActiveCourse> = HashMap::new();
    for session in sessions {
        let Some(detail) = course_of.get(&session.session.class_id) else {
            continue;
        };
        counted
            .entry(detail.class.course_id)
            .or_insert_with(|| ActiveCourse {
                course_id: detail.class.course_id,
                course_code: detail.course_code.clone(),
                course_name: detail.course_name.clone(),
                session_count: 0,
            })
            .session_count += 1;
    }

    let mut courses: Vec<ActiveCourse> = counted.into_values().collect();
    courses.sort_by(|a, b| {
        b.session_count
            .cmp(&a.session_count)
            .then_with(|| a.course_code.cmp(&b.course_code))
    });
    courses.truncate(limit);
    courses
}

pub async fn super_admin_dashboard(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let today = campus_today();
    let today_str = today.format("%Y-%m-%d").to_string();
    let month_start = today
        .with_day(1)
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string();

    let total_users = match storage.count_users().await {
        Ok(count) => count,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };
    let by_role = match storage.count_users_by_role().await {
        Ok(counts) => counts,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };
    let role_count = |role: UserRole| {
        by_role
            .iter()
            .filter(|c| c.role == role)
            .map(|c| c.count)
            .sum::<u64>()
    };
    let total_courses = match storage.count_courses().await {
        Ok(count) => count,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };
    let classes = match storage.list_class_details(ClassFilter::default()).await {
        Ok(classes) => classes,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };
    let ongoing = storage
        .list_sessions(SessionFilter {
            statuses: vec![SessionStatus::Ongoing],
            ..Default::default()
        })
        .await;
    let ongoing = match ongoing {
        Ok(sessions) => sessions,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };
    let today_counts = match storage
        .count_attendance_by_status(&today_str, &today_str, None)
        .await
    {
        Ok(counts) => counts,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };
    let unread_notifications = match storage.count_all_unread_notifications().await {
        Ok(count) => count,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };
    let attendance_statistics = match storage
        .count_attendance_by_status(&month_start, &today_str, None)
        .await
    {
        Ok(counts) => counts,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };
    let month_sessions = storage
        .list_sessions(SessionFilter {
            date_from: Some(month_start),
            date_to: Some(today_str),
            ..Default::default()
        })
        .await;
    let month_sessions = match month_sessions {
        Ok(sessions) => sessions,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };

    let overview = SystemOverview {
        total_users,
        total_students: role_count(UserRole::Student),
        total_lecturers: role_count(UserRole::Lecturer),
        total_courses,
        total_classes: classes
            .iter()
            .filter(|c| c.class.status == ClassStatus::Active)
            .count() as u64,
        active_sessions: ongoing.len() as u64,
        today_attendances: today_counts.total(),
        unread_notifications,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SuperAdminDashboardResponse {
            overview,
            attendance_statistics,
            active_courses: most_active_courses(&classes, &month_sessions, ACTIVE_COURSE_LIMIT),
        },
        "Data dashboard berhasil diambil",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{
        class_with_schedule, new_session, storage, user,
    };
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_super_admin_overview() {
        let raw = storage().await;
        let admin = user(&raw, "ADMIN001", UserRole::Admin).await;
        user(&raw, "220211060001", UserRole::Student).await;
        user(&raw, "220211060002", UserRole::Student).await;
        let lecturer = user(&raw, "198703152015041001", UserRole::Lecturer).await;
        let class = class_with_schedule(&raw, "TI101", Some(lecturer.id), vec![]).await;
        let session = raw
            .create_session_impl(new_session(class.id, "2025-06-02", "08:00", "10:00"))
            .await
            .unwrap();
        raw.update_session_status_impl(session.id, SessionStatus::Ongoing)
            .await
            .unwrap();
        let storage = shared(raw);

        let resp = super_admin_dashboard(
            &DashboardService::new_lazy(),
            &request_as(&storage, Some(&admin)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        let overview = &body["data"]["overview"];
        assert_eq!(overview["total_users"], 4);
        assert_eq!(overview["total_students"], 2);
        assert_eq!(overview["total_lecturers"], 1);
        assert_eq!(overview["total_courses"], 1);
        assert_eq!(overview["total_classes"], 1);
        assert_eq!(overview["active_sessions"], 1);
    }
}

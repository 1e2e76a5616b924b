use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Datelike, Duration, NaiveDate};

use super::DashboardService;
use crate::models::ApiResponse;
use crate::models::attendance::entities::SessionStatus;
use crate::models::attendance::requests::SessionFilter;
use crate::models::courses::entities::ClassStatus;
use crate::models::courses::requests::ClassFilter;
use crate::models::dashboard::responses::LecturerDashboardResponse;
use crate::services::{campus_today, current_user, server_error};

/// 本周第一天（周日）
pub(crate) fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(today.weekday().num_days_from_sunday() as i64)
}

pub async fn lecturer_dashboard(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;
    let today = campus_today();
    let today_str = today.format("%Y-%m-%d").to_string();

    let classes = storage
        .list_class_details(ClassFilter {
            lecturer_id: Some(user.id),
            statuses: vec![ClassStatus::Active],
            ..Default::default()
        })
        .await;
    let classes = match classes {
        Ok(classes) => classes,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };
    let class_ids: Vec<i64> = classes.iter().map(|c| c.class.id).collect();

    let today_sessions = storage
        .list_sessions(SessionFilter {
            class_ids: Some(class_ids.clone()),
            date_from: Some(today_str.clone()),
            date_to: Some(today_str.clone()),
            statuses: vec![],
        })
        .await;
    let today_sessions = match today_sessions {
        Ok(sessions) => sessions,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };
    let ongoing_sessions = storage
        .list_sessions(SessionFilter {
            class_ids: Some(class_ids.clone()),
            statuses: vec![SessionStatus::Ongoing],
            ..Default::default()
        })
        .await;
    let ongoing_sessions = match ongoing_sessions {
        Ok(sessions) => sessions,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };

    let week_from = week_start(today).format("%Y-%m-%d").to_string();
    // 没有班级时不能传 None，否则会统计全校
    let week_statistics = if class_ids.is_empty() {
        Default::default()
    } else {
        match storage
            .count_attendance_by_status(&week_from, &today_str, Some(class_ids))
            .await
        {
            Ok(counts) => counts,
            Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        LecturerDashboardResponse {
            total_students: classes.iter().map(|c| c.enrolled_count).sum(),
            classes,
            today_sessions,
            ongoing_sessions,
            week_statistics,
        },
        "Data dashboard berhasil diambil",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{class_with_schedule, storage, user};
    use actix_web::http::StatusCode;

    #[test]
    fn test_week_starts_on_sunday() {
        let wednesday = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        assert_eq!(week_start(wednesday), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(week_start(sunday), sunday);
    }

    #[actix_web::test]
    async fn test_lecturer_sees_own_classes() {
        let raw = storage().await;
        let lecturer = user(&raw, "198703152015041001", UserRole::Lecturer).await;
        let other = user(&raw, "198703152015041002", UserRole::Lecturer).await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let mine = class_with_schedule(&raw, "TI101", Some(lecturer.id), vec![]).await;
        class_with_schedule(&raw, "TI202", Some(other.id), vec![]).await;
        raw.create_enrollment_impl(student.id, mine.id).await.unwrap();
        let storage = shared(raw);

        let resp = lecturer_dashboard(
            &DashboardService::new_lazy(),
            &request_as(&storage, Some(&lecturer)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        let classes = body["data"]["classes"].as_array().unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0]["id"], mine.id);
        assert_eq!(body["data"]["total_students"], 1);
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveDate;

use super::DashboardService;
use crate::models::ApiResponse;
use crate::models::attendance::entities::{SessionStatus, StudentAttendance};
use crate::models::attendance::requests::SessionFilter;
use crate::models::attendance::responses::StatusCounts;
use crate::models::courses::requests::ClassFilter;
use crate::models::courses::responses::CourseClassDetail;
use crate::models::dashboard::responses::{
    RecentAttendance, SessionWithClass, StudentDashboardResponse, TodayClass,
};
use crate::services::{campus_today, current_user, percentage, server_error};
use crate::storage::Storage;
use crate::utils::schedule::{indonesian_day, slots_on};

// 最近考勤显示条数
const RECENT_LIMIT: usize = 5;

/// 学生已选班级、区间内的课次以及本人的考勤记录
pub(crate) struct StudentAttendanceData {
    pub classes: Vec<CourseClassDetail>,
    pub sessions: Vec<SessionWithClass>,
    pub records: Vec<StudentAttendance>,
}

pub(crate) async fn load_student_attendance(
    storage: &Arc<dyn Storage>,
    student_id: i64,
    date_from: Option<String>,
    date_to: Option<String>,
) -> crate::errors::Result<StudentAttendanceData> {
    let classes = storage
        .list_class_details(ClassFilter {
            student_id: Some(student_id),
            ..Default::default()
        })
        .await?;
    let sessions = storage
        .list_sessions(SessionFilter {
            class_ids: Some(classes.iter().map(|c| c.class.id).collect()),
            date_from,
            date_to,
            statuses: vec![],
        })
        .await?;
    let session_ids: Vec<i64> = sessions.iter().map(|s| s.session.id).collect();
    let records = storage
        .list_attendances_for_sessions(&session_ids)
        .await?
        .into_iter()
        .filter(|r| r.student_id == student_id)
        .collect();

    Ok(StudentAttendanceData {
        classes,
        sessions,
        records,
    })
}

/// 今天（按印尼语星期名）要上的课，按开始时间排序
pub(crate) fn today_schedule(classes: &[CourseClassDetail], today: NaiveDate) -> Vec<TodayClass> {
    let mut schedule: Vec<TodayClass> = classes
        .iter()
        .flat_map(|detail| {
            slots_on(&detail.class.schedule, today)
                .into_iter()
                .map(move |slot| TodayClass {
                    class_id: detail.class.id,
                    class_name: detail.class.class_name.clone(),
                    course_code: detail.course_code.clone(),
                    course_name: detail.course_name.clone(),
                    room: detail.class.room.clone(),
                    slot,
                })
        })
        .collect();
    schedule.sort_by(|a, b| a.slot.start_time.cmp(&b.slot.start_time));
    schedule
}

/// 最近几次考勤，新的在前
pub(crate) fn recent_attendance(
    sessions: &[SessionWithClass],
    records: &[StudentAttendance],
    limit: usize,
) -> Vec<RecentAttendance> {
    let by_id: HashMap<i64, &SessionWithClass> =
        sessions.iter().map(|s| (s.session.id, s)).collect();

    let mut recent: Vec<RecentAttendance> = records
        .iter()
        .filter_map(|record| {
            let session = by_id.get(&record.session_id)?;
            Some(RecentAttendance {
                session_id: record.session_id,
                session_date: session.session.session_date.clone(),
                course_name: session.course_name.clone(),
                class_name: session.class_name.clone(),
                status: record.status,
            })
        })
        .collect();
    recent.sort_by(|a, b| {
        b.session_date
            .cmp(&a.session_date)
            .then_with(|| b.session_id.cmp(&a.session_id))
    });
    recent.truncate(limit);
    recent
}

pub async fn student_dashboard(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;
    let today = campus_today();

    let data = match load_student_attendance(&storage, user.id, None, None).await {
        Ok(data) => data,
        Err(e) => return Ok(server_error("Gagal mengambil data dashboard", e)),
    };

    let held = data
        .sessions
        .iter()
        .filter(|s| {
            matches!(
                s.session.status,
                SessionStatus::Ongoing | SessionStatus::Completed
            )
        })
        .count() as u64;
    let mut counts = StatusCounts::default();
    for record in &data.records {
        counts.add(record.status);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentDashboardResponse {
            today: indonesian_day(today).to_string(),
            today_schedule: today_schedule(&data.classes, today),
            recent_attendance: recent_attendance(&data.sessions, &data.records, RECENT_LIMIT),
            attendance_percentage: percentage(counts.attended(), held),
            counts,
            enrolled_classes: data.classes,
        },
        "Data dashboard berhasil diambil",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::{AttendanceMethod, AttendanceStatus};
    use crate::models::attendance::requests::NewStudentAttendance;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{
        class_with_schedule, new_session, slot, storage, user,
    };
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_today_schedule_matches_indonesian_day() {
        let raw = storage().await;
        let class = class_with_schedule(
            &raw,
            "TI101",
            None,
            vec![slot("Rabu", "10:00", "12:00"), slot("Senin", "08:00", "10:00")],
        )
        .await;
        let classes = raw
            .list_class_details_impl(ClassFilter::default())
            .await
            .unwrap();
        assert_eq!(classes[0].class.id, class.id);

        // 2025-06-02 是周一
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let schedule = today_schedule(&classes, monday);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].slot.start_time, "08:00");

        let tuesday = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        assert!(today_schedule(&classes, tuesday).is_empty());
    }

    #[actix_web::test]
    async fn test_student_dashboard() {
        let raw = storage().await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let class = class_with_schedule(&raw, "TI101", None, vec![]).await;
        raw.create_enrollment_impl(student.id, class.id).await.unwrap();

        for (date, status) in [
            ("2025-06-02", Some(AttendanceStatus::Present)),
            ("2025-06-09", None),
        ] {
            let session = raw
                .create_session_impl(new_session(class.id, date, "08:00", "10:00"))
                .await
                .unwrap();
            raw.update_session_status_impl(session.id, SessionStatus::Completed)
                .await
                .unwrap();
            if let Some(status) = status {
                raw.create_attendance_impl(NewStudentAttendance {
                    session_id: session.id,
                    student_id: student.id,
                    status,
                    check_in_time: None,
                    attendance_method: AttendanceMethod::Manual,
                    confidence_score: None,
                    notes: None,
                })
                .await
                .unwrap();
            }
        }
        let storage = shared(raw);

        let resp = student_dashboard(
            &DashboardService::new_lazy(),
            &request_as(&storage, Some(&student)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["data"]["enrolled_classes"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["attendance_percentage"], 50.0);
        assert_eq!(body["data"]["recent_attendance"][0]["session_date"], "2025-06-02");
    }
}

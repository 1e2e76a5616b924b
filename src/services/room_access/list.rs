//! 门禁管理页面的班级列表

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{FixedOffset, NaiveDate};

use super::RoomAccessService;
use crate::config::AppConfig;
use crate::models::attendance::entities::StudentAttendance;
use crate::models::attendance::requests::SessionFilter;
use crate::models::courses::responses::CourseClassDetail;
use crate::models::dashboard::responses::SessionWithClass;
use crate::models::room_access::requests::{RoomAccessFilter, RoomAccessListParams};
use crate::models::room_access::responses::{
    ClassRoomAccess, RoomAccessListResponse, RoomAccessTotals,
};
use crate::models::ApiResponse;
use crate::services::{campus_today, server_error};
use crate::utils::schedule::slots_on;

/// 今天出席或迟到的人次及最后签到时间（校园时区 HH:MM）
pub(crate) fn room_access_of(
    detail: CourseClassDetail,
    today: NaiveDate,
    today_sessions: &[SessionWithClass],
    records: &[StudentAttendance],
    offset: FixedOffset,
) -> ClassRoomAccess {
    let session_ids: Vec<i64> = today_sessions
        .iter()
        .filter(|s| s.session.class_id == detail.class.id)
        .map(|s| s.session.id)
        .collect();
    let attended = records
        .iter()
        .filter(|r| session_ids.contains(&r.session_id) && r.status.counts_as_attended());

    let (today_access, last_check_in) = attended.fold((0u64, None), |(count, last), r| {
        let last = match (last, r.check_in_time) {
            (Some(prev), Some(at)) if at > prev => Some(at),
            (None, at) => at,
            (prev, _) => prev,
        };
        (count + 1, last)
    });

    ClassRoomAccess {
        access_active: detail.class.has_room_access(),
        today_schedule: slots_on(&detail.class.schedule, today),
        class_id: detail.class.id,
        class_name: detail.class.class_name,
        course_code: detail.course_code,
        course_name: detail.course_name,
        lecturer_name: detail.class.lecturer_name,
        room: detail.class.room,
        status: detail.class.status,
        enrolled_count: detail.enrolled_count,
        today_access,
        last_access: last_check_in.map(|at| at.with_timezone(&offset).format("%H:%M").to_string()),
    }
}

pub(crate) fn filter_room_access(
    items: Vec<ClassRoomAccess>,
    filter: RoomAccessFilter,
    search: Option<&str>,
) -> Vec<ClassRoomAccess> {
    let keyword = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    items
        .into_iter()
        .filter(|item| match filter {
            RoomAccessFilter::All => true,
            RoomAccessFilter::Active => item.access_active,
            RoomAccessFilter::Inactive => !item.access_active,
        })
        .filter(|item| {
            let Some(k) = &keyword else { return true };
            [
                item.course_name.as_str(),
                item.course_code.as_str(),
                item.class_name.as_str(),
                item.lecturer_name.as_deref().unwrap_or_default(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(k))
        })
        .collect()
}

/// 班级总数和有效数基于全部班级，访问人次只算筛选后的
pub(crate) fn room_access_totals(
    all: &[ClassRoomAccess],
    shown: &[ClassRoomAccess],
) -> RoomAccessTotals {
    RoomAccessTotals {
        total_classes: all.len() as u64,
        active_classes: all.iter().filter(|c| c.access_active).count() as u64,
        total_access: shown.iter().map(|c| c.today_access).sum(),
    }
}

pub async fn list_room_access(
    service: &RoomAccessService,
    query: RoomAccessListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let today = campus_today();
    let today_str = today.format("%Y-%m-%d").to_string();

    let classes = match storage.list_class_details(Default::default()).await {
        Ok(classes) => classes,
        Err(e) => return Ok(server_error("Gagal mengambil data akses ruangan", e)),
    };

    let sessions = storage
        .list_sessions(SessionFilter {
            class_ids: None,
            date_from: Some(today_str.clone()),
            date_to: Some(today_str),
            statuses: Vec::new(),
        })
        .await;
    let sessions = match sessions {
        Ok(sessions) => sessions,
        Err(e) => return Ok(server_error("Gagal mengambil data akses ruangan", e)),
    };
    let session_ids: Vec<i64> = sessions.iter().map(|s| s.session.id).collect();
    let records = match storage.list_attendances_for_sessions(&session_ids).await {
        Ok(records) => records,
        Err(e) => return Ok(server_error("Gagal mengambil data akses ruangan", e)),
    };

    let offset = AppConfig::get().campus_offset();
    let all: Vec<ClassRoomAccess> = classes
        .into_iter()
        .map(|detail| room_access_of(detail, today, &sessions, &records, offset))
        .collect();
    let items = filter_room_access(
        all.clone(),
        query.filter.unwrap_or(RoomAccessFilter::All),
        query.search.as_deref(),
    );
    let totals = room_access_totals(&all, &items);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        RoomAccessListResponse { items, totals },
        "Data akses ruangan berhasil diambil",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::ClassStatus;

    fn access(name: &str, lecturer: Option<&str>, active: bool, today: u64) -> ClassRoomAccess {
        ClassRoomAccess {
            class_id: 1,
            class_name: format!("{name}-A"),
            course_code: "TI101".to_string(),
            course_name: name.to_string(),
            lecturer_name: lecturer.map(str::to_string),
            room: None,
            status: if active {
                ClassStatus::Active
            } else {
                ClassStatus::Inactive
            },
            access_active: active,
            enrolled_count: 10,
            today_access: today,
            last_access: None,
            today_schedule: vec![],
        }
    }

    #[test]
    fn test_filter_and_totals() {
        let all = vec![
            access("Algoritma", Some("Dr. Sari"), true, 5),
            access("Basis Data", None, false, 0),
            access("Jaringan", Some("Pak Budi"), true, 3),
        ];

        let active = filter_room_access(all.clone(), RoomAccessFilter::Active, None);
        assert_eq!(active.len(), 2);

        let inactive = filter_room_access(all.clone(), RoomAccessFilter::Inactive, None);
        assert_eq!(inactive[0].course_name, "Basis Data");

        let by_lecturer = filter_room_access(all.clone(), RoomAccessFilter::All, Some("budi"));
        assert_eq!(by_lecturer.len(), 1);

        let totals = room_access_totals(&all, &by_lecturer);
        assert_eq!(
            totals,
            RoomAccessTotals {
                total_classes: 3,
                active_classes: 2,
                total_access: 3,
            }
        );
    }
}

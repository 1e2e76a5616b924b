use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::AttendanceService;
use crate::models::attendance::entities::SessionStatus;
use crate::models::attendance::requests::{CheckAccessRequest, SessionFilter};
use crate::models::attendance::responses::{AccessibleSession, CheckAccessResponse};
use crate::models::courses::entities::ClassStatus;
use crate::models::courses::requests::ClassFilter;
use crate::models::room_access::entities::AccessMethod;
use crate::models::room_access::requests::NewDoorAccessLog;
use crate::models::users::entities::UserStatus;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{campus_today, server_error};
use crate::utils::schedule::parse_date;

const ALLOWED_REASON: &str = "Has scheduled classes today";
const DENIED_REASON: &str = "No scheduled classes today";

/// 门禁判定：用户在该日期有进行中的已选课次即放行。每次判定都写门禁日志。
pub async fn check_access(
    service: &AttendanceService,
    check: CheckAccessRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let date = match check.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(date) => {
            if parse_date(date).is_err() {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    "Format tanggal harus YYYY-MM-DD",
                )));
            }
            date.to_string()
        }
        None => campus_today().format("%Y-%m-%d").to_string(),
    };

    let storage = service.get_storage(request)?;

    let user = match storage.get_user_by_id(check.user_id).await {
        Ok(user) => user,
        Err(e) => return Ok(server_error("Gagal memeriksa akses ruangan", e)),
    };

    let sessions = match &user {
        Some(user) if user.status == UserStatus::Active => {
            let classes = storage
                .list_class_details(ClassFilter {
                    student_id: Some(user.id),
                    statuses: vec![ClassStatus::Active],
                    ..Default::default()
                })
                .await;
            let classes = match classes {
                Ok(classes) => classes,
                Err(e) => return Ok(server_error("Gagal memeriksa akses ruangan", e)),
            };
            let found = storage
                .list_sessions(SessionFilter {
                    class_ids: Some(classes.iter().map(|c| c.class.id).collect()),
                    date_from: Some(date.clone()),
                    date_to: Some(date.clone()),
                    statuses: vec![SessionStatus::Ongoing],
                })
                .await;
            match found {
                Ok(found) => found,
                Err(e) => return Ok(server_error("Gagal memeriksa akses ruangan", e)),
            }
        }
        _ => Vec::new(),
    };

    let allowed = !sessions.is_empty();
    let reason = if allowed { ALLOWED_REASON } else { DENIED_REASON };

    let log = NewDoorAccessLog {
        // 未知用户不关联外键
        user_id: user.as_ref().map(|u| u.id),
        class_id: sessions.first().map(|s| s.session.class_id),
        access_method: if check.confidence_score.is_some() {
            AccessMethod::FaceRecognition
        } else {
            AccessMethod::Api
        },
        access_granted: allowed,
        confidence_score: check.confidence_score,
        reason: Some(reason.to_string()),
    };
    if let Err(e) = storage.create_door_log(log).await {
        return Ok(server_error("Gagal mencatat log akses pintu", e));
    }

    if allowed {
        info!("Door access granted to user {} on {}", check.user_id, date);
    } else {
        warn!("Door access denied to user {} on {}", check.user_id, date);
    }

    let sessions = sessions
        .into_iter()
        .map(|s| AccessibleSession {
            session_id: s.session.id,
            session_date: s.session.session_date,
            start_time: s.session.start_time,
            end_time: s.session.end_time,
            topic: s.session.topic,
            class_name: s.class_name,
            course_name: s.course_name,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CheckAccessResponse {
            allowed,
            sessions,
            reason: reason.to_string(),
        },
        if allowed { "Akses diizinkan" } else { "Akses ditolak" },
    )))
}

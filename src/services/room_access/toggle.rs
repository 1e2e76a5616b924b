use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::RoomAccessService;
use crate::models::courses::entities::ClassStatus;
use crate::models::room_access::responses::AccessChangeResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::courses::load_class;
use crate::services::{campus_today, server_error};

fn class_missing() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::ClassNotFound,
        "Kelas tidak ditemukan",
    ))
}

pub async fn revoke_access(
    service: &RoomAccessService,
    class_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Err(resp) = load_class(&storage, class_id).await {
        return Ok(resp);
    }

    match storage
        .update_class_status(class_id, ClassStatus::Inactive)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(class_missing()),
        Err(e) => return Ok(server_error("Gagal mencabut akses ruangan", e)),
    }

    let today = campus_today().format("%Y-%m-%d").to_string();
    let sessions_closed = match storage.complete_open_sessions(class_id, &today).await {
        Ok(count) => count,
        Err(e) => return Ok(server_error("Gagal mencabut akses ruangan", e)),
    };

    info!(
        "Room access revoked for class {} ({} sessions closed)",
        class_id, sessions_closed
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AccessChangeResponse {
            class_id,
            status: ClassStatus::Inactive,
            sessions_closed,
        },
        "Akses ruangan berhasil dicabut untuk kelas ini",
    )))
}

pub async fn grant_access(
    service: &RoomAccessService,
    class_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage
        .update_class_status(class_id, ClassStatus::Active)
        .await
    {
        Ok(Some(_)) => {
            info!("Room access granted for class {}", class_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                AccessChangeResponse {
                    class_id,
                    status: ClassStatus::Active,
                    sessions_closed: 0,
                },
                "Akses ruangan berhasil diberikan untuk kelas ini",
            )))
        }
        Ok(None) => Ok(class_missing()),
        Err(e) => Ok(server_error("Gagal memberikan akses ruangan", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::SessionStatus;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{
        class_with_schedule, new_session, slot, storage,
    };
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_revoke_then_grant() {
        let raw = storage().await;
        let class =
            class_with_schedule(&raw, "TI101", None, vec![slot("Senin", "08:00", "10:00")]).await;
        let today = campus_today().format("%Y-%m-%d").to_string();
        let open = raw
            .create_session_impl(new_session(class.id, &today, "08:00", "10:00"))
            .await
            .unwrap();
        let storage = shared(raw);
        let req = request_as(&storage, None);
        let service = RoomAccessService::new_lazy();

        let resp = revoke_access(&service, class.id, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["sessions_closed"], 1);

        let class_now = storage.get_course_class_by_id(class.id).await.unwrap().unwrap();
        assert!(!class_now.has_room_access());
        let session = storage.get_session_by_id(open.id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Completed);

        let resp = grant_access(&service, class.id, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let class_now = storage.get_course_class_by_id(class.id).await.unwrap().unwrap();
        assert!(class_now.has_room_access());

        let resp = grant_access(&service, class.id + 100, &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SystemService;
use crate::errors::SiAbsensiError;
use crate::models::room_access::requests::DoorAccessLogQuery;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::server_error;

pub async fn list_door_access_logs(
    service: &SystemService,
    query: DoorAccessLogQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_door_logs(query).await {
        Ok(logs) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            logs,
            "Log akses pintu berhasil diambil",
        ))),
        Err(SiAbsensiError::Validation(msg)) => Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))),
        Err(e) => Ok(server_error("Gagal mengambil log akses pintu", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaginationQuery;
    use crate::services::test_support::{request_as, shared};
    use crate::storage::sea_orm_storage::test_support::storage;
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_bad_date_is_bad_request() {
        let storage = shared(storage().await);
        let resp = list_door_access_logs(
            &SystemService::new_lazy(),
            DoorAccessLogQuery {
                pagination: PaginationQuery::default(),
                user_id: None,
                class_id: None,
                granted: None,
                start_date: Some("2025-02-30".to_string()),
                end_date: None,
            },
            &request_as(&storage, None),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

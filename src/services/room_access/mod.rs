pub mod detail;
pub mod door;
pub mod list;
pub mod toggle;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::room_access::requests::RoomAccessListParams;
use crate::storage::Storage;

pub struct RoomAccessService {
    storage: Option<Arc<dyn Storage>>,
}

impl RoomAccessService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_classes(
        &self,
        query: RoomAccessListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_room_access(self, query, request).await
    }

    pub async fn door_status(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        door::door_status(self, request).await
    }

    pub async fn class_detail(
        &self,
        class_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        detail::class_access_detail(self, class_id, request).await
    }

    // 班级置为 inactive，并结束今天未完成的课次
    pub async fn revoke(&self, class_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        toggle::revoke_access(self, class_id, request).await
    }

    pub async fn grant(&self, class_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        toggle::grant_access(self, class_id, request).await
    }
}

pub mod count;
pub mod delete;
pub mod list;
pub mod read;
pub mod send;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::notifications::entities::Notification;
use crate::models::notifications::requests::{
    BroadcastNotificationRequest, NotificationListQuery, SendNotificationRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct NotificationService {
    storage: Option<Arc<dyn Storage>>,
}

impl NotificationService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list(
        &self,
        query: NotificationListQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_notifications(self, query, request).await
    }

    pub async fn unread_count(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        count::get_unread_count(self, request).await
    }

    pub async fn mark_read(
        &self,
        notification_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        read::mark_as_read(self, notification_id, request).await
    }

    pub async fn mark_all_read(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        read::mark_all_as_read(self, request).await
    }

    pub async fn delete(
        &self,
        notification_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_notification(self, notification_id, request).await
    }

    pub async fn send(
        &self,
        body: SendNotificationRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        send::send_notification(self, body, request).await
    }

    pub async fn broadcast(
        &self,
        body: BroadcastNotificationRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        send::broadcast_notification(self, body, request).await
    }
}

/// 只能操作自己的通知；别人的通知也按不存在处理
pub(crate) async fn load_own_notification(
    storage: &Arc<dyn Storage>,
    notification_id: i64,
    user_id: i64,
) -> Result<Notification, HttpResponse> {
    match storage.get_notification_by_id(notification_id).await {
        Ok(Some(n)) if n.user_id == user_id => Ok(n),
        Ok(_) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotificationNotFound,
            "Notifikasi tidak ditemukan",
        ))),
        Err(e) => Err(super::server_error("Gagal mengambil notifikasi", e)),
    }
}

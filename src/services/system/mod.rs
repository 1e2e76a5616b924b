//! 系统设置与门禁日志，除公开设置外仅管理员可用

pub mod door_logs;
pub mod settings;
pub mod settings_cache;

pub use settings_cache::DynamicConfig;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::room_access::requests::DoorAccessLogQuery;
use crate::models::system::requests::{SettingsQuery, UpdateSettingRequest};
use crate::storage::Storage;
use crate::utils::SafeSettingKey;

pub struct SystemService {
    storage: Option<Arc<dyn Storage>>,
}

impl SystemService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn get_settings(
        &self,
        query: SettingsQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        settings::get_settings(self, query, request).await
    }

    pub async fn get_public_settings(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        settings::get_public_settings(self, request).await
    }

    pub async fn update_setting(
        &self,
        key: SafeSettingKey,
        body: UpdateSettingRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        settings::update_setting(self, key, body, request).await
    }

    pub async fn door_access_logs(
        &self,
        query: DoorAccessLogQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        door_logs::list_door_access_logs(self, query, request).await
    }
}

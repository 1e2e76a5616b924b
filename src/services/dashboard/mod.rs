//! 各角色的仪表盘

pub mod admin;
pub mod calendar;
pub mod lecturer;
pub mod student;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::dashboard::requests::CalendarParams;
use crate::storage::Storage;

pub struct DashboardService {
    storage: Option<Arc<dyn Storage>>,
}

impl DashboardService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn super_admin(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        admin::super_admin_dashboard(self, request).await
    }

    pub async fn lecturer(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        lecturer::lecturer_dashboard(self, request).await
    }

    pub async fn student(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        student::student_dashboard(self, request).await
    }

    pub async fn calendar(
        &self,
        params: CalendarParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        calendar::attendance_calendar(self, params, request).await
    }
}

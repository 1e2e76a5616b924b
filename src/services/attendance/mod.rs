pub mod access;
pub mod history;
pub mod record;
pub mod records;
pub mod sessions;
pub mod statistics;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::PaginationQuery;
use crate::models::attendance::entities::AttendanceSession;
use crate::models::attendance::requests::{
    AttendanceHistoryParams, CheckAccessRequest, CreateSessionRequest, RecordAttendanceRequest,
    RecordFaceAttendanceRequest, SessionListParams, UpdateAttendanceRequest,
};
use crate::models::courses::entities::CourseClass;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::courses::can_manage_class;
use crate::storage::Storage;

pub struct AttendanceService {
    storage: Option<Arc<dyn Storage>>,
}

impl AttendanceService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_session(
        &self,
        session: CreateSessionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        sessions::create_session(self, session, request).await
    }

    pub async fn list_class_sessions(
        &self,
        class_id: i64,
        query: SessionListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        sessions::list_class_sessions(self, class_id, query, request).await
    }

    // scheduled -> ongoing
    pub async fn start_session(
        &self,
        session_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        sessions::start_session(self, session_id, request).await
    }

    // ongoing -> completed
    pub async fn end_session(
        &self,
        session_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        sessions::end_session(self, session_id, request).await
    }

    pub async fn record_attendance(
        &self,
        record: RecordAttendanceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        record::record_attendance(self, record, request).await
    }

    pub async fn record_face_attendance(
        &self,
        record: RecordFaceAttendanceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        record::record_face_attendance(self, record, request).await
    }

    pub async fn session_records(
        &self,
        session_id: i64,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        records::session_records(self, session_id, query, request).await
    }

    pub async fn update_record(
        &self,
        attendance_id: i64,
        update: UpdateAttendanceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        records::update_record(self, attendance_id, update, request).await
    }

    pub async fn class_statistics(
        &self,
        class_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        statistics::class_statistics(self, class_id, request).await
    }

    // 门禁设备调用，不经过 JWT
    pub async fn check_access(
        &self,
        check: CheckAccessRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        access::check_access(self, check, request).await
    }

    pub async fn history(
        &self,
        query: AttendanceHistoryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        history::attendance_history(self, query, request).await
    }
}

/// 读取课次及其班级，并检查当前用户能否管理
pub(crate) async fn load_managed_session(
    storage: &Arc<dyn Storage>,
    user: &User,
    session_id: i64,
) -> Result<(AttendanceSession, CourseClass), HttpResponse> {
    let not_found = || {
        HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SessionNotFound,
            "Sesi kehadiran tidak ditemukan atau Anda tidak memiliki akses",
        ))
    };

    let session = match storage.get_session_by_id(session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => return Err(not_found()),
        Err(e) => return Err(super::server_error("Gagal mengambil sesi kehadiran", e)),
    };
    let class = match storage.get_course_class_by_id(session.class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => return Err(not_found()),
        Err(e) => return Err(super::server_error("Gagal mengambil sesi kehadiran", e)),
    };

    if !can_manage_class(user, &class) {
        return Err(not_found());
    }
    Ok((session, class))
}

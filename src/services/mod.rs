//! 业务逻辑层
//!
//! 每个业务域一个 Service，每个操作一个文件。Service 本身不持有状态，
//! 存储实例从 actix 的 app data 中获取。

pub mod attendance;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod notifications;
pub mod reports;
pub mod room_access;
pub mod system;
pub mod users;

pub use attendance::AttendanceService;
pub use auth::AuthService;
pub use courses::CourseService;
pub use dashboard::DashboardService;
pub use notifications::NotificationService;
pub use reports::ReportService;
pub use room_access::RoomAccessService;
pub use system::SystemService;
pub use users::UserService;

use std::fmt::Display;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, error::InternalError, web};

use crate::middlewares::RequireJWT;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 从 app data 取存储实例
pub(crate) fn storage_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            tracing::error!("Storage not found in app data");
            InternalError::from_response(
                "storage not configured",
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Storage not configured",
                )),
            )
            .into()
        })
}

/// 当前登录用户，未经过 RequireJWT 时返回 401
pub(crate) fn current_user(request: &HttpRequest) -> ActixResult<User> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        InternalError::from_response(
            "unauthenticated",
            HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "Unauthorized")),
        )
        .into()
    })
}

/// 记录错误并返回 500
pub(crate) fn server_error(context: &str, err: impl Display) -> HttpResponse {
    tracing::error!("{context}: {err}");
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        format!("{context}: {err}"),
    ))
}

/// 校园时区的今天
pub(crate) fn campus_today() -> chrono::NaiveDate {
    crate::config::AppConfig::get().campus_now().date_naive()
}

/// 保留一位小数的百分比，分母为 0 时返回 0
pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use actix_web::{HttpMessage, HttpRequest, HttpResponse, test::TestRequest, web};

    use crate::models::users::entities::User;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    pub fn shared(storage: SeaOrmStorage) -> Arc<dyn Storage> {
        Arc::new(storage)
    }

    /// 带存储和当前用户的请求
    pub fn request_as(storage: &Arc<dyn Storage>, user: Option<&User>) -> HttpRequest {
        let request = TestRequest::default()
            .app_data(web::Data::new(storage.clone()))
            .to_http_request();
        if let Some(user) = user {
            request.extensions_mut().insert(user.clone());
        }
        request
    }

    pub async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = actix_web::body::to_bytes(response.into_body())
            .await
            .unwrap_or_default();
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 4), 75.0);
        assert_eq!(percentage(2, 3), 66.7);
    }

    #[actix_web::test]
    async fn test_missing_storage_is_an_error() {
        let request = actix_web::test::TestRequest::default().to_http_request();
        assert!(storage_from_request(&request).is_err());
        assert!(current_user(&request).is_err());
    }
}

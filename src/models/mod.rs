//! 业务数据模型
//!
//! 与 `entity` 中的数据库实体分离，负责 API 请求/响应的序列化。

pub mod attendance;
pub mod auth;
pub mod common;
pub mod courses;
pub mod dashboard;
pub mod notifications;
pub mod reports;
pub mod room_access;
pub mod system;
pub mod users;

mod error_code;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery};
pub use error_code::ErrorCode;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

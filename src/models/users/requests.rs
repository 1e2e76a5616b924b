use super::entities::{UserRole, UserStatus};
use crate::models::common::PaginationQuery;
use serde::Deserialize;

// 用户列表查询参数（来自HTTP请求）
#[derive(Debug, Clone, Deserialize)]
pub struct UserListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
    pub sort_by: Option<UserSortField>,
    pub sort_order: Option<SortOrder>,
}

crate::models::common::define_string_enum! {
    pub enum UserSortField {
        CreatedAt => "created_at",
        FullName => "full_name",
        Email => "email",
        UserId => "user_id",
        Role => "role",
    }
}

crate::models::common::define_string_enum! {
    pub enum SortOrder {
        Asc => "asc" | "ASC",
        Desc => "desc" | "DESC",
    }
}

// 用户创建请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub user_id: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: UserRole,
    pub status: Option<UserStatus>,
    pub phone: Option<String>,
    pub program_study: Option<String>,
    pub semester: Option<i32>,
    pub department: Option<String>,
}

// 用户更新请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub phone: Option<String>,
    pub program_study: Option<String>,
    pub semester: Option<i32>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserStatusRequest {
    pub status: UserStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdateStatusRequest {
    #[serde(alias = "userIds")]
    pub user_ids: Vec<i64>,
    pub status: UserStatus,
}

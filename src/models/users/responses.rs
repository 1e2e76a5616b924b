use super::entities::{User, UserRole};
use crate::models::common::PaginationInfo;
use serde::Serialize;

// 用户响应
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

// 用户列表响应
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub items: Vec<User>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize)]
pub struct BulkUpdateStatusResponse {
    pub updated: u64,
    /// 当前管理员自己的 ID 会被排除
    pub skipped_self: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleCount {
    pub role: UserRole,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserOverview {
    pub total_users: u64,
    pub total_students: u64,
    pub total_lecturers: u64,
    pub total_admins: u64,
    pub active_users: u64,
    pub inactive_users: u64,
    pub suspended_users: u64,
    pub recent_registrations: u64,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboardResponse {
    pub overview: UserOverview,
    pub users_by_role: Vec<RoleCount>,
}

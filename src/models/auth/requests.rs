use serde::Deserialize;

use crate::models::users::entities::UserRole;

// 用户登录请求（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// 邮箱或 NIM/NIP
    pub email: String,
    /// 密码
    pub password: String,
    /// 是否记住我
    #[serde(default)]
    pub remember_me: bool,
}

/// 自助注册请求
///
/// 学生需要 NIM 和专业，教师需要 NIP 和系别；管理员不能自助注册。
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user_id: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default = "default_register_role")]
    pub role: UserRole,
    pub phone: Option<String>,
    pub program_study: Option<String>,
    pub semester: Option<i32>,
    pub department: Option<String>,
}

fn default_register_role() -> UserRole {
    UserRole::Student
}

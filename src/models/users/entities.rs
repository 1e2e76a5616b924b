use serde::{Deserialize, Serialize};

use crate::models::common::define_string_enum;

define_string_enum! {
    /// 用户角色，`super-admin` 为旧系统的管理员写法
    pub enum UserRole {
        Student => "student",
        Lecturer => "lecturer",
        Admin => "admin" | "super-admin",
    }
}

impl UserRole {
    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin]
    }
    pub fn lecturer_roles() -> &'static [&'static UserRole] {
        &[&Self::Lecturer, &Self::Admin]
    }
    pub fn student_roles() -> &'static [&'static UserRole] {
        &[&Self::Student]
    }
    pub fn all_roles() -> &'static [&'static UserRole] {
        &[&Self::Student, &Self::Lecturer, &Self::Admin]
    }
}

define_string_enum! {
    /// 用户状态
    pub enum UserStatus {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// NIM（学生）或 NIP（教师）
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub phone: Option<String>,
    pub program_study: Option<String>,
    pub semester: Option<i32>,
    pub department: Option<String>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    // 生成 token 对（access + refresh）
    pub fn generate_token_pair(
        &self,
        refresh_token_expiry: Option<chrono::TimeDelta>,
    ) -> crate::errors::Result<crate::utils::jwt::TokenPair> {
        crate::utils::jwt::JwtUtils::generate_token_pair(
            self.id,
            self.role.as_str(),
            refresh_token_expiry,
        )
        .map_err(|e| crate::errors::SiAbsensiError::authentication(format!("生成 token 对失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_accepts_legacy_admin_name() {
        assert_eq!("super-admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_role_groups() {
        assert!(UserRole::lecturer_roles().contains(&&UserRole::Admin));
        assert!(!UserRole::lecturer_roles().contains(&&UserRole::Student));
        assert_eq!(UserRole::all_roles().len(), 3);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let now = chrono::Utc::now();
        let user = User {
            id: 1,
            user_id: "220211060001".to_string(),
            email: "mhs@polimdo.ac.id".to_string(),
            password_hash: "secret".to_string(),
            full_name: "Mahasiswa Satu".to_string(),
            role: UserRole::Student,
            status: UserStatus::Active,
            phone: None,
            program_study: Some("Teknik Informatika".to_string()),
            semester: Some(3),
            department: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "student");
    }
}

pub mod create;
pub mod dashboard;
pub mod delete;
pub mod get;
pub mod list;
pub mod status;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::users::entities::UserStatus;
use crate::models::users::requests::{
    BulkUpdateStatusRequest, CreateUserRequest, UpdateUserRequest, UserListParams,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct UserService {
    storage: Option<Arc<dyn Storage>>,
}

impl UserService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 管理员仪表盘
    pub async fn dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        dashboard::admin_dashboard(self, request).await
    }

    // 获取用户列表
    pub async fn list_users(
        &self,
        query: UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_users(self, query, request).await
    }

    // 创建用户
    pub async fn create_user(
        &self,
        user_data: CreateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_user(self, user_data, request).await
    }

    // 根据ID获取用户
    pub async fn get_user(&self, user_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_user(self, user_id, request).await
    }

    // 更新用户信息
    pub async fn update_user(
        &self,
        user_id: i64,
        update_data: UpdateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_user(self, user_id, update_data, request).await
    }

    // 删除用户
    pub async fn delete_user(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_user(self, user_id, request).await
    }

    // 修改单个用户状态
    pub async fn update_status(
        &self,
        user_id: i64,
        status: UserStatus,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        status::update_user_status(self, user_id, status, request).await
    }

    // 批量修改状态
    pub async fn bulk_update_status(
        &self,
        bulk: BulkUpdateStatusRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        status::bulk_update_status(self, bulk, request).await
    }
}

/// 检查邮箱和 NIM/NIP 是否被其他用户占用
pub(crate) async fn check_identity_available(
    storage: &Arc<dyn Storage>,
    email: Option<&str>,
    user_id: Option<&str>,
    exclude_id: Option<i64>,
) -> Result<(), HttpResponse> {
    let is_other = |id: i64| exclude_id != Some(id);

    if let Some(email) = email {
        match storage.get_user_by_email(email).await {
            Ok(Some(user)) if is_other(user.id) => {
                return Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::UserEmailAlreadyExists,
                    "Email sudah terdaftar",
                )));
            }
            Ok(_) => {}
            Err(e) => return Err(super::server_error("Gagal memeriksa email", e)),
        }
    }

    if let Some(user_id) = user_id {
        match storage.get_user_by_user_id(user_id).await {
            Ok(Some(user)) if is_other(user.id) => {
                return Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::UserIdAlreadyExists,
                    "User ID sudah digunakan",
                )));
            }
            Ok(_) => {}
            Err(e) => return Err(super::server_error("Gagal memeriksa NIM/NIP", e)),
        }
    }

    Ok(())
}

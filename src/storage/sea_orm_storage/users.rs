use super::{SeaOrmStorage, like};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{Result, SiAbsensiError};
use crate::models::{
    PaginationInfo,
    users::{
        entities::{User, UserRole, UserStatus},
        requests::{CreateUserRequest, SortOrder, UpdateUserRequest, UserListParams, UserSortField},
        responses::{RoleCount, UserListResponse, UserOverview},
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建用户，`password` 须为哈希值
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            user_id: Set(req.user_id),
            email: Set(req.email.to_lowercase()),
            password_hash: Set(req.password),
            full_name: Set(req.full_name),
            role: Set(req.role.to_string()),
            status: Set(req.status.unwrap_or(UserStatus::Active).to_string()),
            phone: Set(req.phone),
            program_study: Set(req.program_study),
            semester: Set(req.semester),
            department: Set(req.department),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("创建用户失败: {e}")))?;

        Ok(result.into_user())
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 邮箱不区分大小写
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_user_id_impl(&self, user_id: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::UserId.eq(user_id.trim()))
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_users_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = Users::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(Column::FullName)
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("批量查询用户失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user()).collect())
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListParams,
    ) -> Result<UserListResponse> {
        let (page, size) = query.pagination.normalized();

        let mut select = Users::find();

        if let Some(pattern) = query.search.as_deref().and_then(contains_pattern) {
            select = select.filter(
                Condition::any()
                    .add(Column::UserId.like(like(&pattern)))
                    .add(Column::Email.like(like(&pattern)))
                    .add(Column::FullName.like(like(&pattern))),
            );
        }

        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let order = match query.sort_order.unwrap_or(SortOrder::Desc) {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        let column = match query.sort_by.unwrap_or(UserSortField::CreatedAt) {
            UserSortField::CreatedAt => Column::CreatedAt,
            UserSortField::FullName => Column::FullName,
            UserSortField::Email => Column::Email,
            UserSortField::UserId => Column::UserId,
            UserSortField::Role => Column::Role,
        };
        select = select.order_by(column, order).order_by_asc(Column::Id);

        let paginator = select.paginate(&self.db, size as u64);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询用户总数失败: {e}")))?;

        let users = paginator
            .fetch_page((page - 1) as u64)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo::new(page, size, total as i64),
        })
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 更新用户信息，只写入提供的字段
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(user_id) = update.user_id {
            model.user_id = Set(user_id);
        }
        if let Some(email) = update.email {
            model.email = Set(email.to_lowercase());
        }
        if let Some(password) = update.password {
            model.password_hash = Set(password);
        }
        if let Some(full_name) = update.full_name {
            model.full_name = Set(full_name);
        }
        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(phone) = update.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(program_study) = update.program_study {
            model.program_study = Set(Some(program_study));
        }
        if let Some(semester) = update.semester {
            model.semester = Set(Some(semester));
        }
        if let Some(department) = update.department {
            model.department = Set(Some(department));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("更新用户失败: {e}")))?;

        self.get_user_by_id_impl(id).await
    }

    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("删除用户失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn bulk_update_user_status_impl(
        &self,
        ids: &[i64],
        status: UserStatus,
    ) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(
                Column::Status,
                sea_orm::sea_query::Expr::value(status.to_string()),
            )
            .col_expr(Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("批量更新用户状态失败: {e}")))?;

        Ok(result.rows_affected)
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("统计用户数量失败: {e}")))?;

        Ok(count)
    }

    /// 按角色、状态分组计数，再汇总
    pub async fn user_overview_impl(&self, since: i64) -> Result<UserOverview> {
        let rows: Vec<(String, String, i64)> = Users::find()
            .select_only()
            .column(Column::Role)
            .column(Column::Status)
            .column_as(Column::Id.count(), "cnt")
            .group_by(Column::Role)
            .group_by(Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("统计用户概况失败: {e}")))?;

        let mut overview = UserOverview::default();
        for (role, status, count) in rows {
            let count = count.max(0) as u64;
            overview.total_users += count;
            match role.parse::<UserRole>() {
                Ok(UserRole::Student) => overview.total_students += count,
                Ok(UserRole::Lecturer) => overview.total_lecturers += count,
                Ok(UserRole::Admin) => overview.total_admins += count,
                Err(_) => {}
            }
            match status.parse::<UserStatus>() {
                Ok(UserStatus::Active) => overview.active_users += count,
                Ok(UserStatus::Inactive) => overview.inactive_users += count,
                Ok(UserStatus::Suspended) => overview.suspended_users += count,
                Err(_) => {}
            }
        }

        overview.recent_registrations = Users::find()
            .filter(Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("统计新注册用户失败: {e}")))?;

        Ok(overview)
    }

    pub async fn count_users_by_role_impl(&self) -> Result<Vec<RoleCount>> {
        let rows: Vec<(String, i64)> = Users::find()
            .select_only()
            .column(Column::Role)
            .column_as(Column::Id.count(), "cnt")
            .group_by(Column::Role)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("按角色统计用户失败: {e}")))?;

        let mut counts: Vec<RoleCount> = rows
            .into_iter()
            .filter_map(|(role, count)| {
                role.parse::<UserRole>().ok().map(|role| RoleCount {
                    role,
                    count: count.max(0) as u64,
                })
            })
            .collect();
        counts.sort_by_key(|c| c.role.as_str());
        Ok(counts)
    }

    pub async fn list_active_user_ids_impl(&self, role: Option<UserRole>) -> Result<Vec<i64>> {
        let mut select = Users::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::Status.eq(UserStatus::Active.to_string()));
        if let Some(role) = role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        select
            .order_by_asc(Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询活跃用户失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{storage, user};
    use super::*;
    use crate::models::PaginationQuery;

    #[tokio::test]
    async fn test_user_lookup_by_identifiers() {
        let storage = storage().await;
        let created = user(&storage, "220211060001", UserRole::Student).await;

        let by_nim = storage
            .get_user_by_user_id_impl("220211060001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_nim.id, created.id);

        let by_email = storage
            .get_user_by_email_impl("220211060001@POLIMDO.ac.id")
            .await
            .unwrap();
        assert!(by_email.is_some());
        assert!(storage.get_user_by_id_impl(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_users_filters_and_search() {
        let storage = storage().await;
        user(&storage, "220211060001", UserRole::Student).await;
        user(&storage, "220211060002", UserRole::Student).await;
        user(&storage, "198501012010", UserRole::Lecturer).await;

        let result = storage
            .list_users_with_pagination_impl(UserListParams {
                pagination: PaginationQuery { page: 1, size: 10 },
                role: Some(UserRole::Student),
                status: None,
                search: None,
                sort_by: Some(UserSortField::UserId),
                sort_order: Some(SortOrder::Asc),
            })
            .await
            .unwrap();
        assert_eq!(result.pagination.total, 2);
        assert_eq!(result.items[0].user_id, "220211060001");

        let result = storage
            .list_users_with_pagination_impl(UserListParams {
                pagination: PaginationQuery::default(),
                role: None,
                status: None,
                search: Some("1985".to_string()),
                sort_by: None,
                sort_order: None,
            })
            .await
            .unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].role, UserRole::Lecturer);
    }

    #[tokio::test]
    async fn test_bulk_status_and_overview() {
        let storage = storage().await;
        let a = user(&storage, "220211060001", UserRole::Student).await;
        let b = user(&storage, "220211060002", UserRole::Student).await;
        user(&storage, "ADMIN001", UserRole::Admin).await;

        let updated = storage
            .bulk_update_user_status_impl(&[a.id, b.id], UserStatus::Suspended)
            .await
            .unwrap();
        assert_eq!(updated, 2);

        let overview = storage.user_overview_impl(0).await.unwrap();
        assert_eq!(overview.total_users, 3);
        assert_eq!(overview.total_students, 2);
        assert_eq!(overview.total_admins, 1);
        assert_eq!(overview.suspended_users, 2);
        assert_eq!(overview.active_users, 1);
        assert_eq!(overview.recent_registrations, 3);

        let active = storage.list_active_user_ids_impl(None).await.unwrap();
        assert_eq!(active.len(), 1);

        let by_role = storage.count_users_by_role_impl().await.unwrap();
        assert_eq!(by_role.len(), 2);
    }

    #[tokio::test]
    async fn test_update_user_partial_fields() {
        let storage = storage().await;
        let created = user(&storage, "220211060001", UserRole::Student).await;

        let updated = storage
            .update_user_impl(
                created.id,
                UpdateUserRequest {
                    full_name: Some("Nama Baru".to_string()),
                    semester: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.full_name, "Nama Baru");
        assert_eq!(updated.semester, Some(5));
        assert_eq!(updated.email, created.email);

        assert!(storage.delete_user_impl(created.id).await.unwrap());
        assert!(
            storage
                .update_user_impl(created.id, UpdateUserRequest::default())
                .await
                .unwrap()
                .is_none()
        );
    }
}

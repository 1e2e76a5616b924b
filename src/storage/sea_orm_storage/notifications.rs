//! 通知存储操作

use super::SeaOrmStorage;
use crate::entity::notifications::{ActiveModel, Column, Entity as Notifications};
use crate::errors::{Result, SiAbsensiError};
use crate::models::{
    PaginationInfo,
    notifications::{
        entities::{Notification, NotificationType},
        requests::{CreateNotificationRequest, NotificationListQuery},
        responses::NotificationListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

// 广播时每批插入的行数
const BROADCAST_CHUNK: usize = 500;

impl SeaOrmStorage {
    /// 创建通知
    pub async fn create_notification_impl(
        &self,
        req: CreateNotificationRequest,
    ) -> Result<Notification> {
        let model = ActiveModel {
            user_id: Set(req.user_id),
            notification_type: Set(req.notification_type.to_string()),
            title: Set(req.title),
            message: Set(req.message),
            is_read: Set(false),
            read_at: Set(None),
            created_by: Set(req.created_by),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("创建通知失败: {e}")))?;

        Ok(result.into_notification())
    }

    /// 同一内容发给多个用户，返回写入条数
    pub async fn create_notifications_for_users_impl(
        &self,
        user_ids: &[i64],
        notification_type: NotificationType,
        title: &str,
        message: &str,
        created_by: Option<i64>,
    ) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();
        let mut inserted = 0u64;

        for chunk in user_ids.chunks(BROADCAST_CHUNK) {
            let models = chunk.iter().map(|user_id| ActiveModel {
                user_id: Set(*user_id),
                notification_type: Set(notification_type.to_string()),
                title: Set(title.to_string()),
                message: Set(message.to_string()),
                is_read: Set(false),
                read_at: Set(None),
                created_by: Set(created_by),
                created_at: Set(now),
                ..Default::default()
            });

            Notifications::insert_many(models)
                .exec_without_returning(&self.db)
                .await
                .map_err(|e| SiAbsensiError::database_operation(format!("批量创建通知失败: {e}")))?;
            inserted += chunk.len() as u64;
        }

        Ok(inserted)
    }

    pub async fn get_notification_by_id_impl(
        &self,
        notification_id: i64,
    ) -> Result<Option<Notification>> {
        let result = Notifications::find_by_id(notification_id)
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询通知失败: {e}")))?;

        Ok(result.map(|m| m.into_notification()))
    }

    /// 列出用户通知（分页）
    pub async fn list_notifications_with_pagination_impl(
        &self,
        user_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        let (page, size) = query.pagination.normalized();

        let mut select = Notifications::find().filter(Column::UserId.eq(user_id));

        // 未读筛选
        if let Some(true) = query.unread_only {
            select = select.filter(Column::IsRead.eq(false));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size as u64);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询通知总数失败: {e}")))?;

        let notifications = paginator
            .fetch_page((page - 1) as u64)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询通知列表失败: {e}")))?;

        let unread_count = self.get_unread_notification_count_impl(user_id).await?;

        Ok(NotificationListResponse {
            items: notifications
                .into_iter()
                .map(|m| m.into_notification())
                .collect(),
            pagination: PaginationInfo::new(page, size, total as i64),
            unread_count,
        })
    }

    pub async fn get_unread_notification_count_impl(&self, user_id: i64) -> Result<i64> {
        let count = Notifications::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询未读通知数量失败: {e}")))?;

        Ok(count as i64)
    }

    /// 全系统未读数，管理员仪表盘使用
    pub async fn count_all_unread_notifications_impl(&self) -> Result<u64> {
        Notifications::find()
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询未读通知数量失败: {e}")))
    }

    pub async fn mark_notification_as_read_impl(&self, notification_id: i64) -> Result<bool> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .col_expr(Column::ReadAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(notification_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("标记通知已读失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn mark_all_notifications_as_read_impl(&self, user_id: i64) -> Result<i64> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .col_expr(Column::ReadAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("标记全部通知已读失败: {e}")))?;

        Ok(result.rows_affected as i64)
    }

    pub async fn delete_notification_impl(&self, notification_id: i64) -> Result<bool> {
        let result = Notifications::delete_by_id(notification_id)
            .exec(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("删除通知失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{storage, user};
    use super::*;
    use crate::models::PaginationQuery;
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_notification_read_flow() {
        let storage = storage().await;
        let student = user(&storage, "220211060001", UserRole::Student).await;

        let first = storage
            .create_notification_impl(CreateNotificationRequest {
                user_id: student.id,
                notification_type: NotificationType::Attendance,
                title: "Absensi tercatat".to_string(),
                message: "Kehadiran Anda telah dicatat".to_string(),
                created_by: None,
            })
            .await
            .unwrap();
        storage
            .create_notifications_for_users_impl(
                &[student.id],
                NotificationType::Announcement,
                "Pengumuman",
                "Libur nasional",
                None,
            )
            .await
            .unwrap();

        assert_eq!(
            storage
                .get_unread_notification_count_impl(student.id)
                .await
                .unwrap(),
            2
        );

        assert!(storage.mark_notification_as_read_impl(first.id).await.unwrap());
        // 已读的再次标记不计入
        assert!(!storage.mark_notification_as_read_impl(first.id).await.unwrap());

        let unread = storage
            .list_notifications_with_pagination_impl(
                student.id,
                NotificationListQuery {
                    pagination: PaginationQuery::default(),
                    unread_only: Some(true),
                },
            )
            .await
            .unwrap();
        assert_eq!(unread.items.len(), 1);
        assert_eq!(unread.unread_count, 1);
        assert_eq!(unread.items[0].title, "Pengumuman");

        let marked = storage
            .mark_all_notifications_as_read_impl(student.id)
            .await
            .unwrap();
        assert_eq!(marked, 1);
        assert_eq!(storage.count_all_unread_notifications_impl().await.unwrap(), 0);

        let read = storage
            .get_notification_by_id_impl(first.id)
            .await
            .unwrap()
            .unwrap();
        assert!(read.is_read);
        assert!(read.read_at.is_some());
        assert!(storage.delete_notification_impl(first.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_broadcast_to_many_users() {
        let storage = storage().await;
        let mut ids = Vec::new();
        for i in 0..3 {
            ids.push(user(&storage, &format!("22021106000{i}"), UserRole::Student).await.id);
        }

        let sent = storage
            .create_notifications_for_users_impl(
                &ids,
                NotificationType::System,
                "Pemeliharaan",
                "Sistem akan offline pukul 22:00",
                Some(ids[0]),
            )
            .await
            .unwrap();
        assert_eq!(sent, 3);
        assert_eq!(storage.count_all_unread_notifications_impl().await.unwrap(), 3);
    }
}

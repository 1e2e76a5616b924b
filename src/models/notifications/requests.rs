use serde::Deserialize;

use super::entities::NotificationType;
use crate::models::common::PaginationQuery;
use crate::models::users::entities::UserRole;

/// 通知列表查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::models::common::deserialize_option_from_str")]
    pub unread_only: Option<bool>,
}

/// 存储层使用的通知创建参数
#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub created_by: Option<i64>,
}

/// 发送给单个用户
#[derive(Debug, Clone, Deserialize)]
pub struct SendNotificationRequest {
    pub user_id: i64,
    #[serde(rename = "type", alias = "notification_type")]
    pub notification_type: Option<NotificationType>,
    pub title: String,
    pub message: String,
}

/// 广播；`role` 为空时发给所有有效用户
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastNotificationRequest {
    pub role: Option<UserRole>,
    #[serde(rename = "type", alias = "notification_type")]
    pub notification_type: Option<NotificationType>,
    pub title: String,
    pub message: String,
}

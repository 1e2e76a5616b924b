use super::SeaOrmStorage;
use crate::config::AppConfig;
use crate::entity::door_access_logs::{ActiveModel, Column, Entity as DoorLogs};
use crate::errors::{Result, SiAbsensiError};
use crate::models::{
    PaginationInfo,
    room_access::{
        entities::DoorAccessLog,
        requests::{DoorAccessLogQuery, NewDoorAccessLog},
        responses::DoorAccessLogListResponse,
    },
};
use crate::utils::schedule::parse_date;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

/// 校园时区某天 00:00 的 UTC 时间戳
fn local_day_start(date: &str) -> Result<i64> {
    let date = parse_date(date)?;
    let offset = AppConfig::get().campus_offset();
    date.and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(offset).single())
        .map(|dt| dt.timestamp())
        .ok_or_else(|| SiAbsensiError::validation(format!("无效日期: {date}")))
}

impl SeaOrmStorage {
    pub async fn create_door_log_impl(&self, req: NewDoorAccessLog) -> Result<DoorAccessLog> {
        let model = ActiveModel {
            user_id: Set(req.user_id),
            class_id: Set(req.class_id),
            access_time: Set(chrono::Utc::now().timestamp()),
            access_method: Set(req.access_method.to_string()),
            access_granted: Set(req.access_granted),
            confidence_score: Set(req.confidence_score),
            reason: Set(req.reason),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("记录门禁日志失败: {e}")))?;

        Ok(result.into_door_log())
    }

    /// 门禁日志分页，日期按校园时区解释，结束日期包含当天
    pub async fn list_door_logs_impl(
        &self,
        query: DoorAccessLogQuery,
    ) -> Result<DoorAccessLogListResponse> {
        let (page, size) = query.pagination.normalized();

        let mut select = DoorLogs::find();
        if let Some(user_id) = query.user_id {
            select = select.filter(Column::UserId.eq(user_id));
        }
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(granted) = query.granted {
            select = select.filter(Column::AccessGranted.eq(granted));
        }
        if let Some(start) = query.start_date.as_deref() {
            select = select.filter(Column::AccessTime.gte(local_day_start(start)?));
        }
        if let Some(end) = query.end_date.as_deref() {
            select = select.filter(Column::AccessTime.lt(local_day_start(end)? + 86_400));
        }

        let paginator = select
            .order_by_desc(Column::AccessTime)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size as u64);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询门禁日志总数失败: {e}")))?;
        let logs = paginator
            .fetch_page((page - 1) as u64)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询门禁日志失败: {e}")))?;

        Ok(DoorAccessLogListResponse {
            items: logs.into_iter().map(|m| m.into_door_log()).collect(),
            pagination: PaginationInfo::new(page, size, total as i64),
        })
    }

    pub async fn list_recent_door_logs_impl(
        &self,
        class_id: i64,
        since: i64,
        limit: u64,
    ) -> Result<Vec<DoorAccessLog>> {
        let logs = DoorLogs::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::AccessTime.gte(since))
            .order_by_desc(Column::AccessTime)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询门禁日志失败: {e}")))?;

        Ok(logs.into_iter().map(|m| m.into_door_log()).collect())
    }

    /// 最近一次放行记录，门状态页面显示
    pub async fn latest_granted_access_impl(&self) -> Result<Option<DoorAccessLog>> {
        let log = DoorLogs::find()
            .filter(Column::AccessGranted.eq(true))
            .order_by_desc(Column::AccessTime)
            .order_by_desc(Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询门禁日志失败: {e}")))?;

        Ok(log.map(|m| m.into_door_log()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::storage;
    use super::*;
    use crate::models::PaginationQuery;
    use crate::models::room_access::entities::AccessMethod;

    fn log(user_id: i64, granted: bool) -> NewDoorAccessLog {
        NewDoorAccessLog {
            user_id: Some(user_id),
            class_id: Some(1),
            access_method: AccessMethod::FaceRecognition,
            access_granted: granted,
            confidence_score: Some(0.9),
            reason: Some(if granted { "Sesi aktif" } else { "Tidak ada sesi aktif" }.to_string()),
        }
    }

    #[tokio::test]
    async fn test_door_log_queries() {
        let storage = storage().await;
        storage.create_door_log_impl(log(7, true)).await.unwrap();
        storage.create_door_log_impl(log(7, false)).await.unwrap();
        storage.create_door_log_impl(log(8, true)).await.unwrap();

        let denied = storage
            .list_door_logs_impl(DoorAccessLogQuery {
                pagination: PaginationQuery::default(),
                user_id: None,
                class_id: None,
                granted: Some(false),
                start_date: None,
                end_date: None,
            })
            .await
            .unwrap();
        assert_eq!(denied.pagination.total, 1);
        assert!(!denied.items[0].access_granted);

        let recent = storage.list_recent_door_logs_impl(1, 0, 2).await.unwrap();
        assert_eq!(recent.len(), 2);

        let latest = storage.latest_granted_access_impl().await.unwrap().unwrap();
        assert_eq!(latest.user_id, Some(8));
    }

    #[tokio::test]
    async fn test_door_log_rejects_bad_date() {
        let storage = storage().await;
        let result = storage
            .list_door_logs_impl(DoorAccessLogQuery {
                pagination: PaginationQuery::default(),
                user_id: None,
                class_id: None,
                granted: None,
                start_date: Some("2025-13-01".to_string()),
                end_date: None,
            })
            .await;
        assert!(result.is_err());
    }
}

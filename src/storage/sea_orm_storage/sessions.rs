use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::attendance_sessions::{ActiveModel, Column, Entity as Sessions};
use crate::entity::course_classes::{Column as ClassColumn, Entity as CourseClasses};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::errors::{Result, SiAbsensiError};
use crate::models::{
    PaginationInfo,
    attendance::{
        entities::{AttendanceSession, SessionStatus},
        requests::{NewAttendanceSession, SessionFilter, SessionListParams},
        responses::SessionListResponse,
    },
    dashboard::responses::SessionWithClass,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::Expr,
};

impl SeaOrmStorage {
    /// session_number 取本班最大值加一
    pub async fn create_session_impl(&self, req: NewAttendanceSession) -> Result<AttendanceSession> {
        let max_number: Option<i32> = Sessions::find()
            .select_only()
            .column_as(Column::SessionNumber.max(), "max_number")
            .filter(Column::ClassId.eq(req.class_id))
            .into_tuple::<Option<i32>>()
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课次序号失败: {e}")))?
            .flatten();

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            class_id: Set(req.class_id),
            session_number: Set(max_number.unwrap_or(0) + 1),
            session_date: Set(req.session_date),
            start_time: Set(req.start_time),
            end_time: Set(req.end_time),
            topic: Set(req.topic),
            session_type: Set(req.session_type.to_string()),
            attendance_method: Set(req.attendance_method.to_string()),
            status: Set(SessionStatus::Scheduled.to_string()),
            notes: Set(req.notes),
            created_by: Set(req.created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("创建课次失败: {e}")))?;

        Ok(result.into_session())
    }

    pub async fn get_session_by_id_impl(&self, id: i64) -> Result<Option<AttendanceSession>> {
        let result = Sessions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课次失败: {e}")))?;

        Ok(result.map(|m| m.into_session()))
    }

    /// 班级课次分页，最新的在前
    pub async fn list_class_sessions_impl(
        &self,
        class_id: i64,
        query: SessionListParams,
    ) -> Result<SessionListResponse> {
        let (page, size) = query.pagination.normalized();

        let mut select = Sessions::find().filter(Column::ClassId.eq(class_id));
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let paginator = select
            .order_by_desc(Column::SessionDate)
            .order_by_desc(Column::StartTime)
            .paginate(&self.db, size as u64);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课次总数失败: {e}")))?;

        let sessions = paginator
            .fetch_page((page - 1) as u64)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课次列表失败: {e}")))?;

        Ok(SessionListResponse {
            items: sessions.into_iter().map(|m| m.into_session()).collect(),
            pagination: PaginationInfo::new(page, size, total as i64),
        })
    }

    /// 按条件查询课次，附带班级与课程名称；按日期、开始时间升序
    pub async fn list_sessions_impl(&self, filter: SessionFilter) -> Result<Vec<SessionWithClass>> {
        let mut select = Sessions::find();

        if let Some(class_ids) = filter.class_ids {
            if class_ids.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(Column::ClassId.is_in(class_ids));
        }
        if let Some(from) = filter.date_from {
            select = select.filter(Column::SessionDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            select = select.filter(Column::SessionDate.lte(to));
        }
        if !filter.statuses.is_empty() {
            select =
                select.filter(Column::Status.is_in(filter.statuses.iter().map(|s| s.to_string())));
        }

        let sessions = select
            .order_by_asc(Column::SessionDate)
            .order_by_asc(Column::StartTime)
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课次失败: {e}")))?;

        if sessions.is_empty() {
            return Ok(Vec::new());
        }

        let mut class_ids: Vec<i64> = sessions.iter().map(|s| s.class_id).collect();
        class_ids.sort_unstable();
        class_ids.dedup();

        let classes: HashMap<i64, (String, i64)> = CourseClasses::find()
            .filter(ClassColumn::Id.is_in(class_ids))
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课次班级失败: {e}")))?
            .into_iter()
            .map(|c| (c.id, (c.class_name, c.course_id)))
            .collect();

        let course_ids: Vec<i64> = classes.values().map(|(_, course_id)| *course_id).collect();
        let courses: HashMap<i64, (String, String)> = Courses::find()
            .filter(CourseColumn::Id.is_in(course_ids))
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课次课程失败: {e}")))?
            .into_iter()
            .map(|c| (c.id, (c.course_code, c.course_name)))
            .collect();

        Ok(sessions
            .into_iter()
            .map(|model| {
                let (class_name, course_id) =
                    classes.get(&model.class_id).cloned().unwrap_or_default();
                let (course_code, course_name) =
                    courses.get(&course_id).cloned().unwrap_or_default();
                SessionWithClass {
                    session: model.into_session(),
                    class_name,
                    course_code,
                    course_name,
                }
            })
            .collect())
    }

    pub async fn update_session_status_impl(
        &self,
        id: i64,
        status: SessionStatus,
    ) -> Result<Option<AttendanceSession>> {
        let result = Sessions::update_many()
            .col_expr(Column::Status, Expr::value(status.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("更新课次状态失败: {e}")))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.get_session_by_id_impl(id).await
    }

    /// 撤销门禁时结束当天未完成的课次
    pub async fn complete_open_sessions_impl(&self, class_id: i64, date: &str) -> Result<u64> {
        let result = Sessions::update_many()
            .col_expr(
                Column::Status,
                Expr::value(SessionStatus::Completed.to_string()),
            )
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::SessionDate.eq(date))
            .filter(Column::Status.is_in([
                SessionStatus::Scheduled.to_string(),
                SessionStatus::Ongoing.to_string(),
            ]))
            .exec(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("结束课次失败: {e}")))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{class_with_schedule, new_session, storage};
    use super::*;
    use crate::models::PaginationQuery;

    #[tokio::test]
    async fn test_session_numbers_increment_per_class() {
        let storage = storage().await;
        let a = class_with_schedule(&storage, "TI101", None, vec![]).await;
        let b = class_with_schedule(&storage, "TI102", None, vec![]).await;

        let first = storage
            .create_session_impl(new_session(a.id, "2025-06-02", "08:00", "10:00"))
            .await
            .unwrap();
        let second = storage
            .create_session_impl(new_session(a.id, "2025-06-09", "08:00", "10:00"))
            .await
            .unwrap();
        let other = storage
            .create_session_impl(new_session(b.id, "2025-06-02", "08:00", "10:00"))
            .await
            .unwrap();

        assert_eq!(first.session_number, 1);
        assert_eq!(second.session_number, 2);
        assert_eq!(other.session_number, 1);
        assert_eq!(first.status, SessionStatus::Scheduled);

        let page = storage
            .list_class_sessions_impl(
                a.id,
                SessionListParams {
                    pagination: PaginationQuery::default(),
                    status: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.items[0].session_date, "2025-06-09");
    }

    #[tokio::test]
    async fn test_list_sessions_with_class_info() {
        let storage = storage().await;
        let class = class_with_schedule(&storage, "TI101", None, vec![]).await;
        for date in ["2025-06-01", "2025-06-02", "2025-06-10"] {
            storage
                .create_session_impl(new_session(class.id, date, "08:00", "10:00"))
                .await
                .unwrap();
        }

        let items = storage
            .list_sessions_impl(SessionFilter {
                class_ids: Some(vec![class.id]),
                date_from: Some("2025-06-01".to_string()),
                date_to: Some("2025-06-07".to_string()),
                statuses: vec![],
            })
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].course_code, "TI101");
        assert_eq!(items[0].class_name, "TI101-A");

        let none = storage
            .list_sessions_impl(SessionFilter {
                class_ids: Some(vec![]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_complete_open_sessions() {
        let storage = storage().await;
        let class = class_with_schedule(&storage, "TI101", None, vec![]).await;
        let morning = storage
            .create_session_impl(new_session(class.id, "2025-06-02", "08:00", "10:00"))
            .await
            .unwrap();
        let afternoon = storage
            .create_session_impl(new_session(class.id, "2025-06-02", "13:00", "15:00"))
            .await
            .unwrap();
        storage
            .update_session_status_impl(morning.id, SessionStatus::Ongoing)
            .await
            .unwrap();
        storage
            .update_session_status_impl(afternoon.id, SessionStatus::Cancelled)
            .await
            .unwrap();

        let closed = storage
            .complete_open_sessions_impl(class.id, "2025-06-02")
            .await
            .unwrap();
        assert_eq!(closed, 1);

        let morning = storage.get_session_by_id_impl(morning.id).await.unwrap().unwrap();
        assert_eq!(morning.status, SessionStatus::Completed);
        let afternoon = storage
            .get_session_by_id_impl(afternoon.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(afternoon.status, SessionStatus::Cancelled);
    }
}

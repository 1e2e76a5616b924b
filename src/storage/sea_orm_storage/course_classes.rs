use std::collections::HashMap;

use super::{SeaOrmStorage, like};
use crate::entity::course_classes::{ActiveModel, Column, Entity as CourseClasses};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::student_enrollments::{Column as EnrollmentColumn, Entity as Enrollments};
use crate::errors::{Result, SiAbsensiError};
use crate::models::courses::{
    entities::{ClassStatus, CourseClass, EnrollmentStatus},
    requests::{ClassFilter, NewCourseClass},
    responses::CourseClassDetail,
};
use crate::utils::{contains_pattern, schedule::serialize_schedule};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};

impl SeaOrmStorage {
    pub async fn create_course_class_impl(&self, req: NewCourseClass) -> Result<CourseClass> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(req.course_id),
            lecturer_id: Set(req.lecturer_id),
            lecturer_name: Set(req.lecturer_name),
            class_name: Set(req.class_name),
            academic_year: Set(req.academic_year),
            semester_period: Set(req.semester_period.to_string()),
            max_students: Set(req.max_students),
            schedule: Set(serialize_schedule(&req.schedule)?),
            room: Set(req.room),
            status: Set(req.status.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("创建班级失败: {e}")))?;

        Ok(result.into_course_class())
    }

    pub async fn get_course_class_by_id_impl(&self, id: i64) -> Result<Option<CourseClass>> {
        let result = CourseClasses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_course_class()))
    }

    /// 班级列表，附带课程信息和已选人数
    pub async fn list_class_details_impl(
        &self,
        filter: ClassFilter,
    ) -> Result<Vec<CourseClassDetail>> {
        let mut select = CourseClasses::find();

        if let Some(course_id) = filter.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }
        if let Some(lecturer_id) = filter.lecturer_id {
            select = select.filter(Column::LecturerId.eq(lecturer_id));
        }
        if !filter.statuses.is_empty() {
            select = select.filter(
                Column::Status.is_in(filter.statuses.iter().map(|s| s.to_string())),
            );
        }

        if let Some(student_id) = filter.student_id {
            let class_ids: Vec<i64> = Enrollments::find()
                .select_only()
                .column(EnrollmentColumn::ClassId)
                .filter(EnrollmentColumn::StudentId.eq(student_id))
                .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Enrolled.to_string()))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| {
                    SiAbsensiError::database_operation(format!("查询学生选课失败: {e}"))
                })?;
            if class_ids.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(Column::Id.is_in(class_ids));
        }

        if let Some(pattern) = filter.search.as_deref().and_then(contains_pattern) {
            let course_ids: Vec<i64> = Courses::find()
                .select_only()
                .column(CourseColumn::Id)
                .filter(
                    Condition::any()
                        .add(CourseColumn::CourseCode.like(like(&pattern)))
                        .add(CourseColumn::CourseName.like(like(&pattern))),
                )
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| SiAbsensiError::database_operation(format!("搜索课程失败: {e}")))?;
            select = select.filter(
                Condition::any()
                    .add(Column::ClassName.like(like(&pattern)))
                    .add(Column::CourseId.is_in(course_ids)),
            );
        }

        let classes = select
            .order_by_asc(Column::CourseId)
            .order_by_asc(Column::ClassName)
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询班级列表失败: {e}")))?;

        if classes.is_empty() {
            return Ok(Vec::new());
        }

        let class_ids: Vec<i64> = classes.iter().map(|c| c.id).collect();
        let mut course_ids: Vec<i64> = classes.iter().map(|c| c.course_id).collect();
        course_ids.sort_unstable();
        course_ids.dedup();

        let courses: HashMap<i64, (String, String)> = Courses::find()
            .filter(CourseColumn::Id.is_in(course_ids))
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询班级课程失败: {e}")))?
            .into_iter()
            .map(|c| (c.id, (c.course_code, c.course_name)))
            .collect();

        let counts = self.enrolled_counts(&class_ids).await?;

        Ok(classes
            .into_iter()
            .map(|model| {
                let (course_code, course_name) =
                    courses.get(&model.course_id).cloned().unwrap_or_default();
                let enrolled_count = counts.get(&model.id).copied().unwrap_or(0);
                CourseClassDetail {
                    class: model.into_course_class(),
                    course_code,
                    course_name,
                    enrolled_count,
                }
            })
            .collect())
    }

    /// 各班级 enrolled 状态的人数
    pub(super) async fn enrolled_counts(&self, class_ids: &[i64]) -> Result<HashMap<i64, u64>> {
        if class_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i64, i64)> = Enrollments::find()
            .select_only()
            .column(EnrollmentColumn::ClassId)
            .column_as(EnrollmentColumn::Id.count(), "cnt")
            .filter(EnrollmentColumn::ClassId.is_in(class_ids.iter().copied()))
            .filter(EnrollmentColumn::Status.eq(EnrollmentStatus::Enrolled.to_string()))
            .group_by(EnrollmentColumn::ClassId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("统计选课人数失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(class_id, count)| (class_id, count.max(0) as u64))
            .collect())
    }

    pub async fn update_class_status_impl(
        &self,
        id: i64,
        status: ClassStatus,
    ) -> Result<Option<CourseClass>> {
        let result = CourseClasses::update_many()
            .col_expr(
                Column::Status,
                sea_orm::sea_query::Expr::value(status.to_string()),
            )
            .col_expr(
                Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("更新班级状态失败: {e}")))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.get_course_class_by_id_impl(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{class_with_schedule, slot, storage, user};
    use super::*;
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_class_schedule_round_trips_through_storage() {
        let storage = storage().await;
        let class = class_with_schedule(
            &storage,
            "TI101",
            None,
            vec![slot("Senin", "08:00", "10:00"), slot("Rabu", "13:00", "15:00")],
        )
        .await;

        let loaded = storage
            .get_course_class_by_id_impl(class.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.schedule.len(), 2);
        assert_eq!(loaded.schedule[1].day, "Rabu");
        assert!(loaded.has_room_access());
    }

    #[tokio::test]
    async fn test_list_class_details_filters() {
        let storage = storage().await;
        let lecturer = user(&storage, "198501012010", UserRole::Lecturer).await;
        let student = user(&storage, "220211060001", UserRole::Student).await;
        let a = class_with_schedule(&storage, "TI101", Some(lecturer.id), vec![]).await;
        class_with_schedule(&storage, "SI201", None, vec![]).await;

        storage
            .create_enrollment_impl(student.id, a.id)
            .await
            .unwrap();

        let by_lecturer = storage
            .list_class_details_impl(ClassFilter {
                lecturer_id: Some(lecturer.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_lecturer.len(), 1);
        assert_eq!(by_lecturer[0].course_code, "TI101");
        assert_eq!(by_lecturer[0].enrolled_count, 1);

        let by_student = storage
            .list_class_details_impl(ClassFilter {
                student_id: Some(student.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_student.len(), 1);

        let searched = storage
            .list_class_details_impl(ClassFilter {
                search: Some("si201".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].course_code, "SI201");
    }

    #[tokio::test]
    async fn test_update_class_status() {
        let storage = storage().await;
        let class = class_with_schedule(&storage, "TI101", None, vec![]).await;

        let updated = storage
            .update_class_status_impl(class.id, ClassStatus::Inactive)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, ClassStatus::Inactive);

        let only_active = storage
            .list_class_details_impl(ClassFilter {
                statuses: vec![ClassStatus::Active],
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(only_active.is_empty());
        assert!(
            storage
                .update_class_status_impl(9999, ClassStatus::Active)
                .await
                .unwrap()
                .is_none()
        );
    }
}

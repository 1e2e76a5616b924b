use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::student_enrollments::{ActiveModel, Column, Entity as Enrollments};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{Result, SiAbsensiError};
use crate::models::courses::{
    entities::{Enrollment, EnrollmentStatus},
    requests::UpdateEnrollmentStatusRequest,
    responses::EnrollmentDetail,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 新选课；同一学生同一班级已有记录（含已退课）时由唯一索引拒绝
    pub async fn create_enrollment_impl(&self, student_id: i64, class_id: i64) -> Result<Enrollment> {
        let model = ActiveModel {
            student_id: Set(student_id),
            class_id: Set(class_id),
            enrollment_date: Set(chrono::Utc::now().timestamp()),
            status: Set(EnrollmentStatus::Enrolled.to_string()),
            final_grade: Set(None),
            final_score: Set(None),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("创建选课记录失败: {e}")))?;

        Ok(result.into_enrollment())
    }

    pub async fn get_enrollment_by_id_impl(&self, id: i64) -> Result<Option<Enrollment>> {
        let result = Enrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询选课记录失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    pub async fn find_enrollment_impl(
        &self,
        student_id: i64,
        class_id: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::ClassId.eq(class_id))
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询选课记录失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    pub async fn count_class_enrollments_impl(&self, class_id: i64) -> Result<u64> {
        Enrollments::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::Status.eq(EnrollmentStatus::Enrolled.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("统计选课人数失败: {e}")))
    }

    /// 班级选课名单（含退课），按学号排序
    pub async fn list_class_enrollments_impl(&self, class_id: i64) -> Result<Vec<EnrollmentDetail>> {
        let enrollments = Enrollments::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_asc(Column::EnrollmentDate)
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询选课名单失败: {e}")))?;

        if enrollments.is_empty() {
            return Ok(Vec::new());
        }

        let student_ids: Vec<i64> = enrollments.iter().map(|e| e.student_id).collect();
        let students: HashMap<i64, _> = Users::find()
            .filter(UserColumn::Id.is_in(student_ids))
            .all(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询学生信息失败: {e}")))?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut items: Vec<EnrollmentDetail> = enrollments
            .into_iter()
            .filter_map(|model| {
                let student = students.get(&model.student_id)?;
                Some(EnrollmentDetail {
                    student_user_id: student.user_id.clone(),
                    student_name: student.full_name.clone(),
                    student_email: student.email.clone(),
                    enrollment: model.into_enrollment(),
                })
            })
            .collect();
        items.sort_by(|a, b| a.student_user_id.cmp(&b.student_user_id));
        Ok(items)
    }

    pub async fn update_enrollment_status_impl(
        &self,
        id: i64,
        update: UpdateEnrollmentStatusRequest,
    ) -> Result<Option<Enrollment>> {
        if self.get_enrollment_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            status: Set(update.status.to_string()),
            ..Default::default()
        };
        // 重新选课时刷新选课日期
        if update.status == EnrollmentStatus::Enrolled {
            model.enrollment_date = Set(chrono::Utc::now().timestamp());
        }
        if let Some(grade) = update.final_grade {
            model.final_grade = Set(Some(grade));
        }
        if let Some(score) = update.final_score {
            model.final_score = Set(Some(score));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("更新选课状态失败: {e}")))?;

        self.get_enrollment_by_id_impl(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{class_with_schedule, storage, user};
    use super::*;
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_enrollment_lifecycle() {
        let storage = storage().await;
        let student = user(&storage, "220211060001", UserRole::Student).await;
        let class = class_with_schedule(&storage, "TI101", None, vec![]).await;

        let enrollment = storage
            .create_enrollment_impl(student.id, class.id)
            .await
            .unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Enrolled);
        assert_eq!(storage.count_class_enrollments_impl(class.id).await.unwrap(), 1);

        // 唯一索引
        assert!(
            storage
                .create_enrollment_impl(student.id, class.id)
                .await
                .is_err()
        );

        let dropped = storage
            .update_enrollment_status_impl(
                enrollment.id,
                UpdateEnrollmentStatusRequest {
                    status: EnrollmentStatus::Dropped,
                    final_grade: None,
                    final_score: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dropped.status, EnrollmentStatus::Dropped);
        assert_eq!(storage.count_class_enrollments_impl(class.id).await.unwrap(), 0);

        let found = storage
            .find_enrollment_impl(student.id, class.id)
            .await
            .unwrap();
        assert_eq!(found.map(|e| e.id), Some(enrollment.id));
    }

    #[tokio::test]
    async fn test_list_class_enrollments_sorted_by_nim() {
        let storage = storage().await;
        let b = user(&storage, "220211060002", UserRole::Student).await;
        let a = user(&storage, "220211060001", UserRole::Student).await;
        let class = class_with_schedule(&storage, "TI101", None, vec![]).await;
        storage.create_enrollment_impl(b.id, class.id).await.unwrap();
        storage.create_enrollment_impl(a.id, class.id).await.unwrap();

        let items = storage.list_class_enrollments_impl(class.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].student_user_id, "220211060001");
        assert_eq!(items[1].student_email, "220211060002@polimdo.ac.id");
    }
}

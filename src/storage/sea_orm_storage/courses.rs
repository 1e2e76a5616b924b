use super::{SeaOrmStorage, like};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::errors::{Result, SiAbsensiError};
use crate::models::{
    PaginationInfo,
    courses::{
        entities::{Course, CourseStatus},
        requests::{CourseListParams, CreateCourseRequest, UpdateCourseRequest},
        responses::CourseListResponse,
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

fn prerequisites_json(prerequisites: &[String]) -> Result<String> {
    serde_json::to_string(prerequisites)
        .map_err(|e| SiAbsensiError::serialization(format!("序列化先修课程失败: {e}")))
}

impl SeaOrmStorage {
    pub async fn create_course_impl(&self, req: CreateCourseRequest) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_code: Set(req.course_code.trim().to_uppercase()),
            course_name: Set(req.course_name),
            credits: Set(req.credits),
            semester: Set(req.semester),
            program_study: Set(req.program_study),
            description: Set(req.description),
            prerequisites: Set(prerequisites_json(&req.prerequisites)?),
            status: Set(CourseStatus::Active.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 课程代码统一大写存储
    pub async fn get_course_by_code_impl(&self, code: &str) -> Result<Option<Course>> {
        let result = Courses::find()
            .filter(Column::CourseCode.eq(code.trim().to_uppercase()))
            .one(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListParams,
    ) -> Result<CourseListResponse> {
        let (page, size) = query.pagination.normalized();

        let mut select = Courses::find();

        if let Some(pattern) = query.search.as_deref().and_then(contains_pattern) {
            select = select.filter(
                Condition::any()
                    .add(Column::CourseCode.like(like(&pattern)))
                    .add(Column::CourseName.like(like(&pattern))),
            );
        }
        if let Some(semester) = query.semester {
            select = select.filter(Column::Semester.eq(semester));
        }
        if let Some(program_study) = query.program_study.filter(|p| !p.trim().is_empty()) {
            select = select.filter(Column::ProgramStudy.eq(program_study.trim()));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let paginator = select
            .order_by_asc(Column::CourseName)
            .order_by_asc(Column::CourseCode)
            .paginate(&self.db, size as u64);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课程总数失败: {e}")))?;

        let courses = paginator
            .fetch_page((page - 1) as u64)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(CourseListResponse {
            items: courses.into_iter().map(|m| m.into_course()).collect(),
            pagination: PaginationInfo::new(page, size, total as i64),
        })
    }

    pub async fn update_course_impl(
        &self,
        id: i64,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        if self.get_course_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(code) = update.course_code {
            model.course_code = Set(code.trim().to_uppercase());
        }
        if let Some(name) = update.course_name {
            model.course_name = Set(name);
        }
        if let Some(credits) = update.credits {
            model.credits = Set(credits);
        }
        if let Some(semester) = update.semester {
            model.semester = Set(semester);
        }
        if let Some(program_study) = update.program_study {
            model.program_study = Set(program_study);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(prerequisites) = update.prerequisites {
            model.prerequisites = Set(prerequisites_json(&prerequisites)?);
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("更新课程失败: {e}")))?;

        self.get_course_by_id_impl(id).await
    }

    /// 班级、选课、课次随外键级联删除
    pub async fn delete_course_impl(&self, id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("删除课程失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_courses_impl(&self) -> Result<u64> {
        Courses::find()
            .count(&self.db)
            .await
            .map_err(|e| SiAbsensiError::database_operation(format!("统计课程数量失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::storage;
    use super::*;
    use crate::models::PaginationQuery;

    fn course(code: &str, semester: i32) -> CreateCourseRequest {
        CreateCourseRequest {
            course_code: code.to_string(),
            course_name: format!("Mata Kuliah {code}"),
            credits: 3,
            semester,
            program_study: "Teknik Informatika".to_string(),
            description: None,
            prerequisites: vec!["TI101".to_string()],
        }
    }

    #[tokio::test]
    async fn test_course_code_is_normalized() {
        let storage = storage().await;
        let created = storage.create_course_impl(course("ti201", 3)).await.unwrap();
        assert_eq!(created.course_code, "TI201");
        assert_eq!(created.prerequisites, vec!["TI101".to_string()]);

        let found = storage.get_course_by_code_impl("ti201").await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(created.id));

        // 唯一约束
        assert!(storage.create_course_impl(course("TI201", 3)).await.is_err());
    }

    #[tokio::test]
    async fn test_list_courses_filters() {
        let storage = storage().await;
        storage.create_course_impl(course("TI101", 1)).await.unwrap();
        storage.create_course_impl(course("TI201", 3)).await.unwrap();
        storage.create_course_impl(course("SI301", 3)).await.unwrap();

        let result = storage
            .list_courses_with_pagination_impl(CourseListParams {
                pagination: PaginationQuery::default(),
                search: Some("TI".to_string()),
                semester: Some(3),
                program_study: None,
                status: None,
            })
            .await
            .unwrap();
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.items[0].course_code, "TI201");
        assert_eq!(storage.count_courses_impl().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_and_delete_course() {
        let storage = storage().await;
        let created = storage.create_course_impl(course("TI101", 1)).await.unwrap();

        let updated = storage
            .update_course_impl(
                created.id,
                UpdateCourseRequest {
                    credits: Some(4),
                    status: Some(CourseStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.credits, 4);
        assert_eq!(updated.status, CourseStatus::Inactive);

        assert!(storage.delete_course_impl(created.id).await.unwrap());
        assert!(!storage.delete_course_impl(created.id).await.unwrap());
    }
}

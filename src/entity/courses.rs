//! 课程实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub course_code: String,
    pub course_name: String,
    pub credits: i32,
    pub semester: i32,
    pub program_study: String,
    pub description: Option<String>,
    /// JSON 数组
    pub prerequisites: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::course_classes::Entity")]
    CourseClasses,
}

impl Related<super::course_classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseClasses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_course(self) -> crate::models::courses::entities::Course {
        use crate::models::courses::entities::{Course, CourseStatus};

        Course {
            id: self.id,
            course_code: self.course_code,
            course_name: self.course_name,
            credits: self.credits,
            semester: self.semester,
            program_study: self.program_study,
            description: self.description,
            prerequisites: serde_json::from_str(&self.prerequisites).unwrap_or_default(),
            status: self
                .status
                .parse::<CourseStatus>()
                .unwrap_or(CourseStatus::Active),
            created_at: super::ts(self.created_at),
            updated_at: super::ts(self.updated_at),
        }
    }
}

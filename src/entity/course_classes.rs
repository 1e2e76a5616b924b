//! 课程班级实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "course_classes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub lecturer_id: Option<i64>,
    pub lecturer_name: Option<String>,
    pub class_name: String,
    pub academic_year: String,
    pub semester_period: String,
    pub max_students: i32,
    /// JSON `[{day,start_time,end_time}]`
    pub schedule: String,
    pub room: Option<String>,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::LecturerId",
        to = "super::users::Column::Id"
    )]
    Lecturer,
    #[sea_orm(has_many = "super::student_enrollments::Entity")]
    StudentEnrollments,
    #[sea_orm(has_many = "super::attendance_sessions::Entity")]
    AttendanceSessions,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lecturer.def()
    }
}

impl Related<super::student_enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentEnrollments.def()
    }
}

impl Related<super::attendance_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_course_class(self) -> crate::models::courses::entities::CourseClass {
        use crate::models::courses::entities::{ClassStatus, CourseClass, SemesterPeriod};

        CourseClass {
            id: self.id,
            course_id: self.course_id,
            lecturer_id: self.lecturer_id,
            lecturer_name: self.lecturer_name,
            class_name: self.class_name,
            academic_year: self.academic_year,
            semester_period: self
                .semester_period
                .parse::<SemesterPeriod>()
                .unwrap_or(SemesterPeriod::Ganjil),
            max_students: self.max_students,
            schedule: crate::utils::schedule::parse_schedule(&self.schedule).unwrap_or_default(),
            room: self.room,
            status: self
                .status
                .parse::<ClassStatus>()
                .unwrap_or(ClassStatus::Inactive),
            created_at: super::ts(self.created_at),
            updated_at: super::ts(self.updated_at),
        }
    }
}

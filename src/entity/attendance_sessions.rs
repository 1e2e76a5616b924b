//! 考勤课次实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub session_number: i32,
    pub session_date: String,
    pub start_time: String,
    pub end_time: String,
    pub topic: Option<String>,
    pub session_type: String,
    pub attendance_method: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course_classes::Entity",
        from = "Column::ClassId",
        to = "super::course_classes::Column::Id"
    )]
    CourseClass,
    #[sea_orm(has_many = "super::student_attendances::Entity")]
    StudentAttendances,
}

impl Related<super::course_classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseClass.def()
    }
}

impl Related<super::student_attendances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentAttendances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_session(self) -> crate::models::attendance::entities::AttendanceSession {
        use crate::models::attendance::entities::{
            AttendanceMethod, AttendanceSession, SessionStatus, SessionType,
        };

        AttendanceSession {
            id: self.id,
            class_id: self.class_id,
            session_number: self.session_number,
            session_date: self.session_date,
            start_time: self.start_time,
            end_time: self.end_time,
            topic: self.topic,
            session_type: self
                .session_type
                .parse::<SessionType>()
                .unwrap_or(SessionType::Lecture),
            attendance_method: self
                .attendance_method
                .parse::<AttendanceMethod>()
                .unwrap_or(AttendanceMethod::Mixed),
            status: self
                .status
                .parse::<SessionStatus>()
                .unwrap_or(SessionStatus::Scheduled),
            notes: self.notes,
            created_by: self.created_by,
            created_at: super::ts(self.created_at),
            updated_at: super::ts(self.updated_at),
        }
    }
}

//! 学生考勤记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_attendances")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub status: String,
    pub check_in_time: Option<i64>,
    pub check_out_time: Option<i64>,
    pub attendance_method: String,
    pub confidence_score: Option<f64>,
    pub notes: Option<String>,
    pub verified_by: Option<i64>,
    pub verified_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_sessions::Entity",
        from = "Column::SessionId",
        to = "super::attendance_sessions::Column::Id"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::attendance_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_attendance(self) -> crate::models::attendance::entities::StudentAttendance {
        use crate::models::attendance::entities::{
            AttendanceMethod, AttendanceStatus, StudentAttendance,
        };

        StudentAttendance {
            id: self.id,
            session_id: self.session_id,
            student_id: self.student_id,
            status: self
                .status
                .parse::<AttendanceStatus>()
                .unwrap_or(AttendanceStatus::Absent),
            check_in_time: self.check_in_time.map(super::ts),
            check_out_time: self.check_out_time.map(super::ts),
            attendance_method: self
                .attendance_method
                .parse::<AttendanceMethod>()
                .unwrap_or(AttendanceMethod::Manual),
            confidence_score: self.confidence_score,
            notes: self.notes,
            verified_by: self.verified_by,
            verified_at: self.verified_at.map(super::ts),
            created_at: super::ts(self.created_at),
            updated_at: super::ts(self.updated_at),
        }
    }
}

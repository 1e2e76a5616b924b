//! 门禁日志实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "door_access_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<i64>,
    pub class_id: Option<i64>,
    pub access_time: i64,
    pub access_method: String,
    pub access_granted: bool,
    pub confidence_score: Option<f64>,
    pub reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_door_log(self) -> crate::models::room_access::entities::DoorAccessLog {
        use crate::models::room_access::entities::{AccessMethod, DoorAccessLog};

        DoorAccessLog {
            id: self.id,
            user_id: self.user_id,
            class_id: self.class_id,
            access_time: super::ts(self.access_time),
            access_method: self
                .access_method
                .parse::<AccessMethod>()
                .unwrap_or(AccessMethod::Api),
            access_granted: self.access_granted,
            confidence_score: self.confidence_score,
            reason: self.reason,
        }
    }
}

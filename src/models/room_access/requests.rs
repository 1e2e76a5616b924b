use serde::Deserialize;

use super::entities::AccessMethod;
use crate::models::common::{PaginationQuery, define_string_enum};

define_string_enum! {
    pub enum RoomAccessFilter {
        All => "all",
        Active => "active",
        Inactive => "inactive",
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomAccessListParams {
    pub filter: Option<RoomAccessFilter>,
    pub search: Option<String>,
}

/// 存储层使用的门禁日志写入参数
#[derive(Debug, Clone)]
pub struct NewDoorAccessLog {
    pub user_id: Option<i64>,
    pub class_id: Option<i64>,
    pub access_method: AccessMethod,
    pub access_granted: bool,
    pub confidence_score: Option<f64>,
    pub reason: Option<String>,
}

/// 门禁日志查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct DoorAccessLogQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::models::common::deserialize_option_from_str")]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::deserialize_option_from_str")]
    pub class_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::deserialize_option_from_str")]
    pub granted: Option<bool>,
    /// YYYY-MM-DD（校园时区）
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

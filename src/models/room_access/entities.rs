use serde::{Deserialize, Serialize};

use crate::models::common::define_string_enum;

define_string_enum! {
    pub enum AccessMethod {
        FaceRecognition => "face_recognition",
        Card => "card",
        Manual => "manual",
        Api => "api",
    }
}

// 门禁日志
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorAccessLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub class_id: Option<i64>,
    pub access_time: chrono::DateTime<chrono::Utc>,
    pub access_method: AccessMethod,
    pub access_granted: bool,
    pub confidence_score: Option<f64>,
    pub reason: Option<String>,
}

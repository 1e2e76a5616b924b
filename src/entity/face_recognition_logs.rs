//! 人脸识别日志实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "face_recognition_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: Option<i64>,
    pub recognized_user_id: Option<i64>,
    pub confidence_score: Option<f64>,
    pub captured_image_path: Option<String>,
    pub recognition_status: String,
    pub processing_time_ms: Option<i32>,
    pub camera_id: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_face_log(self) -> crate::models::attendance::entities::FaceRecognitionLog {
        use crate::models::attendance::entities::{FaceRecognitionLog, RecognitionStatus};

        FaceRecognitionLog {
            id: self.id,
            session_id: self.session_id,
            recognized_user_id: self.recognized_user_id,
            confidence_score: self.confidence_score,
            captured_image_path: self.captured_image_path,
            recognition_status: self
                .recognition_status
                .parse::<RecognitionStatus>()
                .unwrap_or(RecognitionStatus::Failed),
            processing_time_ms: self.processing_time_ms,
            camera_id: self.camera_id,
            created_at: super::ts(self.created_at),
        }
    }
}

//! 路径参数提取器
//!
//! 路径中的 ID 必须是正整数，非法时直接返回统一的 400 响应，
//! 不把 actix 默认的纯文本错误暴露给前端。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

pub(crate) fn parse_positive_i64(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

pub(crate) fn invalid_path_param(name: &str, raw: &str) -> actix_web::Error {
    let body = ApiResponse::<()>::error_empty(
        ErrorCode::BadRequest,
        format!("Invalid path parameter '{name}': {raw}"),
    );
    InternalError::from_response(
        format!("invalid path parameter {name}"),
        HttpResponse::BadRequest().json(body),
    )
    .into()
}

/// 定义按名字读取路径参数的 i64 提取器，
/// 同时实现 `Deserialize`，可以放进 `web::Path<(A, B)>` 里使用
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                let raw = req.match_info().get($param).unwrap_or_default();
                futures_util::future::ready(
                    $crate::utils::extractor::parse_positive_i64(raw)
                        .map($name)
                        .ok_or_else(|| $crate::utils::extractor::invalid_path_param($param, raw)),
                )
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                $crate::utils::extractor::parse_positive_i64(&raw)
                    .map($name)
                    .ok_or_else(|| {
                        serde::de::Error::custom(format!("invalid {}: {}", $param, raw))
                    })
            }
        }
    };
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeCourseIdI64, "course_id");
define_safe_i64_extractor!(SafeClassIdI64, "class_id");
define_safe_i64_extractor!(SafeSessionIdI64, "session_id");
define_safe_i64_extractor!(SafeStudentIdI64, "student_id");
define_safe_i64_extractor!(SafeLecturerIdI64, "lecturer_id");

/// 系统设置路径 `/{category}/{key}`，只允许小写字母、数字和下划线
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeSettingKey {
    pub category: String,
    pub key: String,
}

impl SafeSettingKey {
    fn is_valid_segment(segment: &str) -> bool {
        !segment.is_empty()
            && segment.len() <= 64
            && segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }

    pub fn full_key(&self) -> String {
        format!("{}.{}", self.category, self.key)
    }
}

impl FromRequest for SafeSettingKey {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let category = req.match_info().get("category").unwrap_or_default();
        let key = req.match_info().get("key").unwrap_or_default();

        if !Self::is_valid_segment(category) {
            return ready(Err(invalid_path_param("category", category)));
        }
        if !Self::is_valid_segment(key) {
            return ready(Err(invalid_path_param("key", key)));
        }
        ready(Ok(SafeSettingKey {
            category: category.to_string(),
            key: key.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_safe_id_from_path() {
        let req = TestRequest::default().param("id", "42").to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 42);
    }

    #[actix_web::test]
    async fn test_safe_id_rejects_non_positive() {
        for raw in ["0", "-3", "abc", ""] {
            let req = TestRequest::default().param("id", raw).to_http_request();
            assert!(SafeIDI64::extract(&req).await.is_err(), "{raw}");
        }
    }

    #[actix_web::test]
    async fn test_setting_key() {
        let req = TestRequest::default()
            .param("category", "attendance")
            .param("key", "late_threshold_minutes")
            .to_http_request();
        let key = SafeSettingKey::extract(&req).await.unwrap();
        assert_eq!(key.full_key(), "attendance.late_threshold_minutes");

        let req = TestRequest::default()
            .param("category", "Attendance")
            .param("key", "x")
            .to_http_request();
        assert!(SafeSettingKey::extract(&req).await.is_err());
    }

    #[test]
    fn test_deserialize_from_string() {
        let id: SafeClassIdI64 = serde_json::from_str("\"15\"").unwrap();
        assert_eq!(id, SafeClassIdI64(15));
        assert!(serde_json::from_str::<SafeClassIdI64>("\"x\"").is_err());
    }
}

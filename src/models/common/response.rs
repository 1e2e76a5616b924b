use serde::{Deserialize, Serialize};

use crate::models::ErrorCode;

/// 统一响应信封
///
/// 前端按 `success` 分支处理，`code` 用于细分错误。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T> {
    fn envelope(code: ErrorCode, data: Option<T>, message: String) -> Self {
        Self {
            success: code == ErrorCode::Success,
            code: code as i32,
            message,
            data,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::envelope(ErrorCode::Success, Some(data), message.into())
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self::envelope(ErrorCode::Success, None, message.into())
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::envelope(code, None, message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_flag_follows_code() {
        let ok = serde_json::to_value(ApiResponse::success(1, "ok")).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["data"], 1);

        let err = serde_json::to_value(ApiResponse::error_empty(ErrorCode::NotFound, "x")).unwrap();
        assert_eq!(err["success"], false);
        assert!(err.get("data").is_none());
    }
}

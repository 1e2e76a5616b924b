use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsQuery {
    pub category: Option<String>,
}

/// 更新配置请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: String,
    pub description: Option<String>,
}

use std::collections::BTreeMap;

use serde::Serialize;

use super::entities::SystemSetting;

/// 系统设置（按类别分组）
#[derive(Debug, Serialize)]
pub struct SystemSettingsResponse {
    pub system_name: String,
    pub environment: String,
    pub settings: BTreeMap<String, Vec<SystemSetting>>,
}

#[derive(Debug, Serialize)]
pub struct SettingResponse {
    pub setting: SystemSetting,
}

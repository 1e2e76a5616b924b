use serde::{Deserialize, Serialize};

use crate::models::common::define_string_enum;

define_string_enum! {
    /// 配置值类型
    pub enum SettingValueType {
        String => "string",
        Integer => "integer",
        Float => "float",
        Boolean => "boolean",
        JsonArray => "json_array",
    }
}

impl SettingValueType {
    /// 检查字符串值能否按该类型解析
    pub fn validate(&self, value: &str) -> Result<(), String> {
        let ok = match self {
            SettingValueType::String => true,
            SettingValueType::Integer => value.trim().parse::<i64>().is_ok(),
            SettingValueType::Float => value.trim().parse::<f64>().is_ok(),
            SettingValueType::Boolean => matches!(value.trim(), "true" | "false"),
            SettingValueType::JsonArray => {
                serde_json::from_str::<Vec<serde_json::Value>>(value).is_ok()
            }
        };
        if ok {
            Ok(())
        } else {
            Err(format!("'{value}' is not a valid {self} value"))
        }
    }
}

/// 系统设置实体，key 形如 `category.name`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    pub value_type: SettingValueType,
    pub category: String,
    pub description: Option<String>,
    /// 非管理员也可读取
    pub is_public: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub updated_by: Option<i64>,
}

/// 拼接配置键
pub fn setting_key(category: &str, name: &str) -> String {
    format!("{}.{}", category.trim().to_lowercase(), name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_validation() {
        assert!(SettingValueType::Integer.validate("15").is_ok());
        assert!(SettingValueType::Integer.validate("15.5").is_err());
        assert!(SettingValueType::Float.validate("0.8").is_ok());
        assert!(SettingValueType::Boolean.validate("yes").is_err());
        assert!(SettingValueType::JsonArray.validate(r#"["a","b"]"#).is_ok());
        assert!(SettingValueType::JsonArray.validate("{}").is_err());
    }

    #[test]
    fn test_setting_key() {
        assert_eq!(
            setting_key("ATTENDANCE", "late_threshold_minutes"),
            "attendance.late_threshold_minutes"
        );
    }
}

//! 动态配置缓存
//!
//! 启动时从 system_settings 表加载，管理员修改设置后热更新。
//! 未加载或值无法解析时回退到静态配置。

use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::config::AppConfig;

static DYNAMIC_CONFIG: OnceLock<RwLock<DynamicConfigCache>> = OnceLock::new();

#[derive(Debug, Default)]
struct DynamicConfigCache {
    settings: HashMap<String, String>,
    initialized: bool,
}

/// 动态配置访问接口
pub struct DynamicConfig;

impl DynamicConfig {
    pub async fn init(settings: Vec<(String, String)>) {
        let cache = DYNAMIC_CONFIG.get_or_init(|| RwLock::new(DynamicConfigCache::default()));

        let mut guard = cache.write().await;
        guard.settings = settings.into_iter().collect();
        guard.initialized = true;

        tracing::info!(
            "动态配置缓存初始化完成，加载了 {} 个配置项",
            guard.settings.len()
        );
    }

    pub async fn update(key: &str, value: &str) {
        if let Some(cache) = DYNAMIC_CONFIG.get() {
            let mut guard = cache.write().await;
            guard.settings.insert(key.to_string(), value.to_string());
            tracing::debug!("动态配置更新: {} = {}", key, value);
        }
    }

    async fn get_string(key: &str) -> Option<String> {
        let cache = DYNAMIC_CONFIG.get()?;
        let guard = cache.read().await;
        guard.settings.get(key).cloned()
    }

    async fn get_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
        Self::get_string(key)
            .await
            .and_then(|v| v.trim().parse().ok())
    }

    pub async fn system_name() -> String {
        Self::get_string("app.system_name")
            .await
            .unwrap_or_else(|| AppConfig::get().app.system_name.clone())
    }

    /// 人脸识别最低置信度（0~1）
    pub async fn min_confidence_score() -> f64 {
        Self::get_parsed("attendance.min_confidence_score")
            .await
            .unwrap_or(AppConfig::get().attendance.min_confidence_score)
    }

    /// 迟到阈值（分钟）
    pub async fn late_threshold_minutes() -> i64 {
        Self::get_parsed("attendance.late_threshold_minutes")
            .await
            .unwrap_or(AppConfig::get().attendance.late_threshold_minutes)
    }

    pub async fn early_checkin_minutes() -> i64 {
        Self::get_parsed("attendance.early_checkin_minutes")
            .await
            .unwrap_or(AppConfig::get().attendance.early_checkin_minutes)
    }

    pub async fn min_attendance_percentage() -> f64 {
        Self::get_parsed("attendance.min_attendance_percentage")
            .await
            .unwrap_or(AppConfig::get().attendance.min_attendance_percentage)
    }

    pub async fn door_location() -> String {
        Self::get_string("door.location")
            .await
            .unwrap_or_else(|| AppConfig::get().door.location.clone())
    }

    pub async fn is_initialized() -> bool {
        match DYNAMIC_CONFIG.get() {
            Some(cache) => cache.read().await.initialized,
            None => false,
        }
    }
}

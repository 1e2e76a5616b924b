//! 对象缓存
//!
//! 缓存值统一存为 JSON 字符串。后端以插件形式注册，
//! 启动时按 `cache.type` 选择，Redis 不可用时回退到 Moka。

pub mod object_cache;
pub mod register;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

pub use register::{ObjectCacheConstructor, get_object_cache_plugin};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    /// 后端出错，键是否存在未知
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    /// `ttl` 为秒，0 表示使用默认 TTL
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

impl dyn ObjectCache {
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.get_raw(key).await {
            CacheResult::Found(json) => match serde_json::from_str(&json) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!("缓存反序列化失败 {}: {}", key, e);
                    self.remove(key).await;
                    None
                }
            },
            _ => None,
        }
    }

    pub async fn insert_json<T: Serialize>(&self, key: String, value: &T, ttl: u64) {
        match serde_json::to_string(value) {
            Ok(json) => self.insert_raw(key, json, ttl).await,
            Err(e) => tracing::debug!("缓存序列化失败 {}: {}", key, e),
        }
    }
}

/// 声明缓存插件：进程启动时通过 ctor 注册构造器
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:literal, $ty:ty) => {
        paste::paste! {
            #[ctor::ctor]
            unsafe fn [<__register_object_cache_ $name>]() {
                $crate::cache::register::register_object_cache_plugin(
                    $name,
                    std::sync::Arc::new(|| {
                        Box::pin(async {
                            <$ty>::new()
                                .map(|cache| {
                                    Box::new(cache) as Box<dyn $crate::cache::ObjectCache>
                                })
                                .map_err($crate::errors::SiAbsensiError::cache_connection)
                        })
                    }),
                );
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_moka_plugin_is_registered() {
        let constructor = get_object_cache_plugin("moka").expect("moka plugin registered");
        let cache: Arc<dyn ObjectCache> = Arc::from(constructor().await.unwrap());

        cache.insert_raw("k".into(), "v".into(), 0).await;
        assert_eq!(cache.get_raw("k").await, CacheResult::Found("v".to_string()));
        cache.remove("k").await;
        assert_eq!(cache.get_raw("k").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let constructor = get_object_cache_plugin("moka").unwrap();
        let cache: Arc<dyn ObjectCache> = Arc::from(constructor().await.unwrap());

        cache.insert_json("nums".into(), &vec![1, 2, 3], 0).await;
        let nums: Option<Vec<i32>> = cache.get_json("nums").await;
        assert_eq!(nums, Some(vec![1, 2, 3]));

        cache.insert_raw("broken".into(), "{".into(), 0).await;
        assert_eq!(cache.get_json::<Vec<i32>>("broken").await, None);
        assert_eq!(cache.get_raw("broken").await, CacheResult::NotFound);
    }
}

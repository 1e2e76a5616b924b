use crate::cache::ObjectCache;
use crate::errors::Result;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::{future::Future, pin::Pin, sync::Arc};

pub type BoxedObjectCacheFuture =
    Pin<Box<dyn Future<Output = Result<Box<dyn ObjectCache>>> + Send>>;
pub type ObjectCacheConstructor = Arc<dyn Fn() -> BoxedObjectCacheFuture + Send + Sync>;

// 插件名 -> 构造器
static OBJECT_CACHE_REGISTRY: Lazy<DashMap<&'static str, ObjectCacheConstructor>> =
    Lazy::new(DashMap::new);

pub fn register_object_cache_plugin(name: &'static str, constructor: ObjectCacheConstructor) {
    OBJECT_CACHE_REGISTRY.insert(name, constructor);
}

pub fn get_object_cache_plugin(name: &str) -> Option<ObjectCacheConstructor> {
    OBJECT_CACHE_REGISTRY
        .get(name)
        .map(|entry| entry.value().clone())
}

pub fn registered_object_cache_plugins() -> Vec<&'static str> {
    let mut names: Vec<_> = OBJECT_CACHE_REGISTRY.iter().map(|e| *e.key()).collect();
    names.sort_unstable();
    names
}

pub fn debug_object_cache_registry() {
    let names = registered_object_cache_plugins();
    if names.is_empty() {
        tracing::debug!("No object cache plugins registered.");
    } else {
        tracing::debug!("Registered object cache plugins: {}", names.join(", "));
    }
}

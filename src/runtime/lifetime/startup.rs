use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::errors::{Result, SiAbsensiError};
use crate::models::users::entities::{UserRole, UserStatus};
use crate::models::users::requests::CreateUserRequest;
use crate::services::system::DynamicConfig;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use std::sync::Arc;
use tracing::{debug, info, warn};

// 默认管理员账号
const ADMIN_USER_ID: &str = "ADMIN001";
const ADMIN_EMAIL: &str = "admin@siabsensi.local";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

async fn try_cache_backend(name: &str) -> Option<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name)?;
    match constructor().await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", name);
            Some(Arc::from(cache))
        }
        Err(e) => {
            warn!("Failed to create {} cache: {}", name, e);
            None
        }
    }
}

/// 创建缓存实例，配置的后端不可用时回退到 moka
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = &AppConfig::get().cache.cache_type;
    warn!("Attempting to create {} cache backend", cache_type);

    if let Some(cache) = try_cache_backend(cache_type).await {
        return Ok(cache);
    }
    if cache_type != "moka" {
        warn!("Falling back to Moka (in-memory) cache");
        if let Some(cache) = try_cache_backend("moka").await {
            return Ok(cache);
        }
    }

    Err(SiAbsensiError::cache_plugin_not_found(format!(
        "No cache backend available (tried: {cache_type})"
    )))
}

/// 生成随机密码
fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 从 system_settings 表加载动态配置，失败时回退到静态配置
pub async fn init_dynamic_config(storage: &Arc<dyn Storage>) {
    match storage.list_all_settings().await {
        Ok(settings) => {
            DynamicConfig::init(settings.into_iter().map(|s| (s.key, s.value)).collect()).await;
        }
        Err(e) => {
            warn!("Failed to load dynamic config from database: {}, using defaults", e);
            DynamicConfig::init(vec![]).await;
        }
    }
}

/// 数据库没有任何用户时创建默认管理员，返回是否创建
pub async fn seed_admin(storage: &Arc<dyn Storage>, password: Option<String>) -> bool {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!("Database already has {} user(s), skipping admin seed", count);
            return false;
        }
        Ok(_) => info!("No users found in database, creating default admin account..."),
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return false;
        }
    }

    let password = password.unwrap_or_else(|| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return false;
        }
    };

    let admin = CreateUserRequest {
        user_id: ADMIN_USER_ID.to_string(),
        email: ADMIN_EMAIL.to_string(),
        password: password_hash,
        full_name: "Administrator".to_string(),
        role: UserRole::Admin,
        status: Some(UserStatus::Active),
        phone: None,
        program_study: None,
        semester: None,
        department: None,
    };

    match storage.create_user(admin).await {
        Ok(user) => {
            info!(
                "Default admin account created (ID: {}, user_id: {})",
                user.id, user.user_id
            );
            true
        }
        Err(e) => {
            warn!("Failed to create admin account: {}", e);
            false
        }
    }
}

/// 准备服务器启动的上下文：存储、动态配置、默认管理员和缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| SiAbsensiError::configuration("Failed to install rustls crypto provider"))?;

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    init_dynamic_config(&storage).await;
    seed_admin(&storage, std::env::var("ADMIN_PASSWORD").ok()).await;

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    Ok(StartupContext { storage, cache })
}

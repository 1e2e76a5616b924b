use std::collections::BTreeMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DynamicConfig, SystemService};
use crate::config::AppConfig;
use crate::models::system::entities::SystemSetting;
use crate::models::{
    ApiResponse, ErrorCode,
    system::{
        requests::{SettingsQuery, UpdateSettingRequest},
        responses::{SettingResponse, SystemSettingsResponse},
    },
};
use crate::services::{current_user, server_error};
use crate::utils::SafeSettingKey;

/// 按类别分组，可只取一个类别
pub(crate) fn group_by_category(
    settings: Vec<SystemSetting>,
    category: Option<&str>,
) -> BTreeMap<String, Vec<SystemSetting>> {
    let mut grouped: BTreeMap<String, Vec<SystemSetting>> = BTreeMap::new();
    for setting in settings {
        if category.is_some_and(|c| !c.eq_ignore_ascii_case(&setting.category)) {
            continue;
        }
        grouped
            .entry(setting.category.clone())
            .or_default()
            .push(setting);
    }
    grouped
}

pub async fn get_settings(
    service: &SystemService,
    query: SettingsQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let settings = match storage.list_all_settings().await {
        Ok(settings) => settings,
        Err(e) => return Ok(server_error("Gagal mengambil pengaturan sistem", e)),
    };

    let response = SystemSettingsResponse {
        system_name: DynamicConfig::system_name().await,
        environment: AppConfig::get().app.environment.clone(),
        settings: group_by_category(settings, query.category.as_deref()),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Pengaturan sistem berhasil diambil",
    )))
}

/// 非管理员可读的配置，按类别分组
pub async fn get_public_settings(
    service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let settings = match storage.list_all_settings().await {
        Ok(settings) => settings.into_iter().filter(|s| s.is_public).collect(),
        Err(e) => return Ok(server_error("Gagal mengambil pengaturan sistem", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        group_by_category(settings, None),
        "Pengaturan publik berhasil diambil",
    )))
}

/// 更新单个配置并刷新缓存
pub async fn update_setting(
    service: &SystemService,
    path: SafeSettingKey,
    body: UpdateSettingRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;
    let key = path.full_key();

    let existing = match storage.get_setting_by_key(&key).await {
        Ok(Some(setting)) => setting,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::NotFound,
                format!("Pengaturan {key} tidak ditemukan"),
            )));
        }
        Err(e) => return Ok(server_error("Gagal mengambil pengaturan", e)),
    };

    if let Err(msg) = existing.value_type.validate(&body.value) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            msg,
        )));
    }

    let setting = match storage
        .update_setting(&key, &body.value, body.description, user.id)
        .await
    {
        Ok(setting) => setting,
        Err(e) => return Ok(server_error("Gagal memperbarui pengaturan", e)),
    };

    DynamicConfig::update(&key, &setting.value).await;
    tracing::info!("Setting {} updated by user {}", key, user.id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SettingResponse { setting },
        "Pengaturan berhasil diperbarui",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::{storage, user};
    use actix_web::http::StatusCode;

    fn key(category: &str, key: &str) -> SafeSettingKey {
        SafeSettingKey {
            category: category.to_string(),
            key: key.to_string(),
        }
    }

    #[actix_web::test]
    async fn test_settings_grouped_by_category() {
        let raw = storage().await;
        let admin = user(&raw, "ADMIN001", UserRole::Admin).await;
        let storage = shared(raw);

        let resp = get_settings(
            &SystemService::new_lazy(),
            SettingsQuery {
                category: Some("attendance".to_string()),
            },
            &request_as(&storage, Some(&admin)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        let groups = body["data"]["settings"].as_object().unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key("attendance"));
    }

    #[actix_web::test]
    async fn test_update_setting_checks_type_and_existence() {
        let raw = storage().await;
        let admin = user(&raw, "ADMIN001", UserRole::Admin).await;
        let storage = shared(raw);
        let service = SystemService::new_lazy();
        let request = request_as(&storage, Some(&admin));

        let resp = update_setting(
            &service,
            key("attendance", "late_threshold_minutes"),
            UpdateSettingRequest {
                value: "sepuluh".to_string(),
                description: None,
            },
            &request,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = update_setting(
            &service,
            key("attendance", "unknown_key"),
            UpdateSettingRequest {
                value: "1".to_string(),
                description: None,
            },
            &request,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = update_setting(
            &service,
            key("attendance", "late_threshold_minutes"),
            UpdateSettingRequest {
                value: "10".to_string(),
                description: None,
            },
            &request,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["setting"]["value"], "10");
        assert_eq!(body["data"]["setting"]["updated_by"], admin.id);
    }

    #[actix_web::test]
    async fn test_public_settings_hide_private_keys() {
        let raw = storage().await;
        let student = user(&raw, "220211060001", UserRole::Student).await;
        let storage = shared(raw);

        let resp = get_public_settings(
            &SystemService::new_lazy(),
            &request_as(&storage, Some(&student)),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        let groups = body["data"].as_object().unwrap();
        assert!(groups.contains_key("attendance"));
        assert!(!groups.contains_key("security"));
        let attendance = groups["attendance"].as_array().unwrap();
        assert!(
            attendance
                .iter()
                .all(|s| s["key"] != "attendance.min_confidence_score")
        );
    }
}

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::ApiResponse;
use crate::models::users::responses::AdminDashboardResponse;
use crate::services::server_error;

// 最近注册统计的天数
const RECENT_DAYS: i64 = 30;

pub async fn admin_dashboard(
    service: &UserService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let since = chrono::Utc::now().timestamp() - RECENT_DAYS * 86_400;

    let overview = match storage.user_overview(since).await {
        Ok(overview) => overview,
        Err(e) => return Ok(server_error("Gagal mengambil ringkasan user", e)),
    };
    let users_by_role = match storage.count_users_by_role().await {
        Ok(counts) => counts,
        Err(e) => return Ok(server_error("Gagal menghitung user per peran", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AdminDashboardResponse {
            overview,
            users_by_role,
        },
        "Data dashboard berhasil diambil",
    )))
}

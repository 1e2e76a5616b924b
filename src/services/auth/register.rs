use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AuthService;
use crate::models::auth::requests::RegisterRequest;
use crate::models::users::{
    entities::{UserRole, UserStatus},
    requests::CreateUserRequest,
    responses::UserResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::server_error;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_simple, validate_user_id};

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).is_none_or(str::is_empty)
}

/// 注册字段校验：学生需要专业，教师需要系别，管理员不开放注册
pub(crate) fn validate_registration(req: &RegisterRequest) -> Result<(), (ErrorCode, String)> {
    if req.role == UserRole::Admin {
        return Err((
            ErrorCode::RegisterFailed,
            "Akun administrator tidak dapat didaftarkan".to_string(),
        ));
    }
    if req.full_name.trim().is_empty() {
        return Err((ErrorCode::BadRequest, "Nama lengkap wajib diisi".to_string()));
    }
    validate_user_id(req.user_id.trim(), req.role)
        .map_err(|msg| (ErrorCode::BadRequest, msg.to_string()))?;
    validate_email(req.email.trim()).map_err(|msg| (ErrorCode::UserEmailInvalid, msg.to_string()))?;
    validate_password_simple(&req.password).map_err(|msg| (ErrorCode::UserPasswordInvalid, msg))?;

    match req.role {
        UserRole::Student if blank(&req.program_study) => Err((
            ErrorCode::BadRequest,
            "Program studi wajib diisi untuk mahasiswa".to_string(),
        )),
        UserRole::Student if req.semester.is_some_and(|s| !(1..=14).contains(&s)) => Err((
            ErrorCode::BadRequest,
            "Semester must be between 1 and 14".to_string(),
        )),
        UserRole::Lecturer if blank(&req.department) => Err((
            ErrorCode::BadRequest,
            "Jurusan wajib diisi untuk dosen".to_string(),
        )),
        _ => Ok(()),
    }
}

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err((code, msg)) = validate_registration(&register_request) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg)));
    }

    let storage = service.get_storage(request)?;
    let email = register_request.email.trim().to_lowercase();
    let user_id = register_request.user_id.trim().to_string();

    match storage.get_user_by_email(&email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email atau User ID sudah terdaftar",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(server_error("Registrasi gagal", e)),
    }

    match storage.get_user_by_user_id(&user_id).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserIdAlreadyExists,
                "Email atau User ID sudah terdaftar",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(server_error("Registrasi gagal", e)),
    }

    let password_hash = match hash_password(&register_request.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(server_error("Gagal memproses kata sandi", e)),
    };

    let is_student = register_request.role == UserRole::Student;
    let create_request = CreateUserRequest {
        user_id,
        email,
        password: password_hash,
        full_name: register_request.full_name.trim().to_string(),
        role: register_request.role,
        status: Some(UserStatus::Active),
        phone: register_request.phone,
        program_study: register_request.program_study,
        semester: register_request.semester.filter(|_| is_student),
        department: register_request.department,
    };

    match storage.create_user(create_request).await {
        Ok(user) => {
            info!("New {} registered: {}", user.role, user.user_id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(UserResponse { user }, "Registrasi berhasil")))
        }
        Err(e) => Ok(server_error("Registrasi gagal", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{body_json, request_as, shared};
    use crate::storage::sea_orm_storage::test_support::storage;
    use actix_web::http::StatusCode;

    fn student() -> RegisterRequest {
        RegisterRequest {
            user_id: "220211060001".to_string(),
            email: "mhs1@polimdo.ac.id".to_string(),
            password: "kampus2025".to_string(),
            full_name: "Mahasiswa Satu".to_string(),
            role: UserRole::Student,
            phone: None,
            program_study: Some("Teknik Informatika".to_string()),
            semester: Some(3),
            department: None,
        }
    }

    #[test]
    fn test_role_specific_fields() {
        assert!(validate_registration(&student()).is_ok());

        let mut no_program = student();
        no_program.program_study = Some("  ".to_string());
        assert!(validate_registration(&no_program).is_err());

        let mut lecturer = student();
        lecturer.role = UserRole::Lecturer;
        lecturer.user_id = "198703152015041001".to_string();
        assert!(validate_registration(&lecturer).is_err());
        lecturer.department = Some("Teknik Elektro".to_string());
        assert!(validate_registration(&lecturer).is_ok());

        let mut admin = student();
        admin.role = UserRole::Admin;
        assert_eq!(
            validate_registration(&admin).unwrap_err().0,
            ErrorCode::RegisterFailed
        );
    }

    #[test]
    fn test_password_policy_applies() {
        let mut weak = student();
        weak.password = "short1".to_string();
        assert_eq!(
            validate_registration(&weak).unwrap_err().0,
            ErrorCode::UserPasswordInvalid
        );
    }

    #[actix_web::test]
    async fn test_register_and_duplicates() {
        let storage = shared(storage().await);
        let req = request_as(&storage, None);
        let service = AuthService::new_lazy();

        let resp = handle_register(&service, student(), &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["user"]["status"], "active");

        let resp = handle_register(&service, student(), &req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body = body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::UserEmailAlreadyExists as i32);

        let mut same_nim = student();
        same_nim.email = "lain@polimdo.ac.id".to_string();
        let resp = handle_register(&service, same_nim, &req).await.unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::UserIdAlreadyExists as i32);
    }
}

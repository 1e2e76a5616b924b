use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::users::entities::UserRole;

// NIM / NIP：字母数字，允许点和连字符
static USER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.-]{2,29}$").expect("Invalid user id regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

static COURSE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,4}[0-9]{3}$").expect("Invalid course code regex"));

pub fn validate_user_id(user_id: &str, role: UserRole) -> Result<(), &'static str> {
    if !USER_ID_RE.is_match(user_id) {
        return match role {
            UserRole::Student => Err("NIM must be 3-30 letters, digits, dots or hyphens"),
            UserRole::Lecturer => Err("NIP must be 3-30 letters, digits, dots or hyphens"),
            UserRole::Admin => Err("User ID must be 3-30 letters, digits, dots or hyphens"),
        };
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 课程代码形如 TI101、AK107
pub fn validate_course_code(code: &str) -> Result<(), &'static str> {
    if !COURSE_CODE_RE.is_match(code) {
        return Err("Course code must look like TI101 (2-4 uppercase letters and 3 digits)");
    }
    Ok(())
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 密码策略：至少 8 位，同时包含字母和数字，且不是常见弱密码
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        errors.push("Password must contain at least one letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    let weak_passwords = [
        "password1",
        "12345678a",
        "qwerty123",
        "admin123",
        "rahasia123",
        "mahasiswa1",
        "dosen123",
    ];
    if weak_passwords
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let result = validate_password(password);
    if result.is_valid {
        Ok(())
    } else {
        Err(result.error_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("Absensi2025").is_valid);
        assert!(validate_password("kampus polimdo 7").is_valid);
    }

    #[test]
    fn test_short_password() {
        let result = validate_password("ab1");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must be at least 8 characters long")
        );
    }

    #[test]
    fn test_password_needs_letter_and_digit() {
        assert!(
            validate_password("12345678")
                .errors
                .contains(&"Password must contain at least one letter")
        );
        assert!(
            validate_password("abcdefgh")
                .errors
                .contains(&"Password must contain at least one digit")
        );
    }

    #[test]
    fn test_common_password() {
        let result = validate_password("Admin123");
        assert!(!result.is_valid);
        assert!(validate_password_simple("Admin123").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("dosen@polimdo.ac.id").is_ok());
        assert!(validate_email("dosen@polimdo").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
    }

    #[test]
    fn test_user_id() {
        assert!(validate_user_id("20241001", UserRole::Student).is_ok());
        assert!(validate_user_id("198501-012", UserRole::Lecturer).is_ok());
        assert_eq!(
            validate_user_id("x", UserRole::Student),
            Err("NIM must be 3-30 letters, digits, dots or hyphens")
        );
        assert!(validate_user_id("bad id", UserRole::Lecturer).is_err());
    }

    #[test]
    fn test_course_code() {
        assert!(validate_course_code("TI101").is_ok());
        assert!(validate_course_code("AK107").is_ok());
        assert!(validate_course_code("ti101").is_err());
        assert!(validate_course_code("TI1010").is_err());
    }
}

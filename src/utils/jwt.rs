use crate::config::AppConfig;
use crate::models::common::string_enum::define_string_enum;
use actix_web::cookie::{Cookie, SameSite};
use chrono::TimeDelta;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const REFRESH_COOKIE_NAME: &str = "siabsensi_refresh";

define_string_enum! {
    /// Token 用途
    pub enum TokenKind {
        Access => "access",
        Refresh => "refresh",
    }
}

// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // users.id
    pub role: String,       // student / lecturer / admin
    pub token_type: String, // access / refresh
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// access token 有效秒数
    pub expires_in: i64,
    /// refresh token 有效秒数，写 cookie 时使用
    pub refresh_expires_in: i64,
}

pub struct JwtUtils;

impl JwtUtils {
    fn encoding_key() -> EncodingKey {
        EncodingKey::from_secret(AppConfig::get().jwt.secret.as_bytes())
    }

    fn decoding_key() -> DecodingKey {
        DecodingKey::from_secret(AppConfig::get().jwt.secret.as_bytes())
    }

    pub fn access_expiry() -> TimeDelta {
        TimeDelta::minutes(AppConfig::get().jwt.access_token_expiry)
    }

    /// 勾选“记住我”时 refresh token 使用更长的有效期
    pub fn refresh_expiry(remember_me: bool) -> TimeDelta {
        let jwt = &AppConfig::get().jwt;
        if remember_me {
            TimeDelta::days(jwt.refresh_token_remember_me_expiry)
        } else {
            TimeDelta::days(jwt.refresh_token_expiry)
        }
    }

    pub fn generate_token(
        user_id: i64,
        role: &str,
        kind: TokenKind,
        expiry: TimeDelta,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            token_type: kind.to_string(),
            exp: (now + expiry).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &Self::encoding_key())
    }

    pub fn generate_access_token(
        user_id: i64,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        Self::generate_token(user_id, role, TokenKind::Access, Self::access_expiry())
    }

    pub fn generate_token_pair(
        user_id: i64,
        role: &str,
        refresh_expiry: Option<TimeDelta>,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        let access_expiry = Self::access_expiry();
        let refresh_expiry = refresh_expiry.unwrap_or_else(|| Self::refresh_expiry(false));

        Ok(TokenPair {
            access_token: Self::generate_token(user_id, role, TokenKind::Access, access_expiry)?,
            refresh_token: Self::generate_token(
                user_id,
                role,
                TokenKind::Refresh,
                refresh_expiry,
            )?,
            expires_in: access_expiry.num_seconds(),
            refresh_expires_in: refresh_expiry.num_seconds(),
        })
    }

    pub fn decode_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &Self::decoding_key(), &Validation::default())
            .map(|data| data.claims)
    }

    fn verify_kind(token: &str, kind: TokenKind) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = Self::decode_token(token)?;
        if claims.token_type != kind.as_str() {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
        }
        Ok(claims)
    }

    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_kind(token, TokenKind::Access)
    }

    pub fn verify_refresh_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_kind(token, TokenKind::Refresh)
    }

    /// 用 refresh token 换新的 access token
    pub fn refresh_access_token(
        refresh_token: &str,
    ) -> Result<(Claims, String), jsonwebtoken::errors::Error> {
        let claims = Self::verify_refresh_token(refresh_token)?;
        let user_id = claims
            .user_id()
            .ok_or(jsonwebtoken::errors::ErrorKind::InvalidSubject)?;
        let token = Self::generate_access_token(user_id, &claims.role)?;
        Ok((claims, token))
    }

    pub fn create_refresh_token_cookie(refresh_token: &str, max_age_secs: i64) -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE_NAME, refresh_token.to_string())
            .path("/api/auth")
            .max_age(actix_web::cookie::time::Duration::seconds(max_age_secs))
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(AppConfig::get().is_production())
            .finish()
    }

    /// 注销时覆盖掉浏览器里的 refresh cookie
    pub fn create_empty_refresh_token_cookie() -> Cookie<'static> {
        Self::create_refresh_token_cookie("", 0)
    }

    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_round_trip() {
        let pair = JwtUtils::generate_token_pair(42, "lecturer", None).unwrap();
        let claims = JwtUtils::verify_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.role, "lecturer");
        assert_eq!(pair.expires_in, JwtUtils::access_expiry().num_seconds());
    }

    #[test]
    fn test_token_kind_is_checked() {
        let pair = JwtUtils::generate_token_pair(7, "student", None).unwrap();
        assert!(JwtUtils::verify_access_token(&pair.refresh_token).is_err());
        assert!(JwtUtils::verify_refresh_token(&pair.access_token).is_err());
        let (claims, access) = JwtUtils::refresh_access_token(&pair.refresh_token).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert!(JwtUtils::verify_access_token(&access).is_ok());
    }

    #[test]
    fn test_remember_me_expiry_is_longer() {
        assert!(JwtUtils::refresh_expiry(true) > JwtUtils::refresh_expiry(false));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(JwtUtils::decode_token("not-a-token").is_err());
    }
}

//! Backend paths, one per logical operation.
//!
//! Only string construction lives here; the contract itself is owned by the
//! backend.

pub const TRANSLATE: &str = "/api/translate";
pub const TRANSLATE_TEXTS: &str = "/api/translate-texts";

pub const SOIL_ANALYZE: &str = "/api/soil/analyze";
pub const SOIL_ANALYZE_UPLOAD: &str = "/api/soil/analyze-upload";
pub const PEST_ANALYZE_UPLOAD: &str = "/api/pest/analyze-upload";

pub const AUTH_LOGIN_OTP: &str = "/api/auth/login-otp";
pub const AUTH_VERIFY_LOGIN_OTP: &str = "/api/auth/verify-login-otp";
pub const AUTH_LOGIN_PASSWORD: &str = "/api/auth/login-password";
pub const AUTH_CREATE_USER_SEND_OTP: &str = "/api/auth/create-user-send-otp";
pub const AUTH_RESEND_OTP: &str = "/api/auth/resend-otp";
pub const AUTH_VERIFY_OTP_SIGNUP: &str = "/api/auth/verify-otp-signup";

/// Current weather for a coordinate pair.
pub fn weather(lat: f64, lon: f64) -> String {
    format!("/api/weather?lat={}&lon={}", lat, lon)
}

use crate::api::{endpoints, ApiClient, ApiError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Common envelope returned by every auth endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

impl AuthResponse {
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AadhaarRequest<'a> {
    aadhar_no: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordLoginRequest<'a> {
    aadhar_no: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OtpRequest<'a> {
    session_token: &'a str,
    otp: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionRequest<'a> {
    session_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest<'a> {
    aadhar_no: &'a str,
    full_name: &'a str,
    password: &'a str,
    state: &'a str,
    district: &'a str,
}

/// New account details sent with `create-user-send-otp`.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub aadhaar: &'a str,
    pub full_name: &'a str,
    pub password: &'a str,
    pub state: &'a str,
    pub district: &'a str,
}

/// Typed calls to the `/api/auth/*` endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login_otp(&self, aadhaar: &str) -> Result<AuthResponse, ApiError> {
        debug!("Requesting login OTP");
        self.client
            .post(endpoints::AUTH_LOGIN_OTP, &AadhaarRequest { aadhar_no: aadhaar })
            .await
    }

    pub async fn verify_login_otp(
        &self,
        session_token: &str,
        otp: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.client
            .post(
                endpoints::AUTH_VERIFY_LOGIN_OTP,
                &OtpRequest { session_token, otp },
            )
            .await
    }

    pub async fn login_password(
        &self,
        aadhaar: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.client
            .post(
                endpoints::AUTH_LOGIN_PASSWORD,
                &PasswordLoginRequest {
                    aadhar_no: aadhaar,
                    password,
                },
            )
            .await
    }

    pub async fn create_user_send_otp(&self, user: NewUser<'_>) -> Result<AuthResponse, ApiError> {
        debug!("Creating user in {}/{}", user.state, user.district);
        self.client
            .post(
                endpoints::AUTH_CREATE_USER_SEND_OTP,
                &CreateUserRequest {
                    aadhar_no: user.aadhaar,
                    full_name: user.full_name,
                    password: user.password,
                    state: user.state,
                    district: user.district,
                },
            )
            .await
    }

    pub async fn resend_otp(&self, session_token: &str) -> Result<AuthResponse, ApiError> {
        self.client
            .post(endpoints::AUTH_RESEND_OTP, &SessionRequest { session_token })
            .await
    }

    pub async fn verify_otp_signup(
        &self,
        session_token: &str,
        otp: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.client
            .post(
                endpoints::AUTH_VERIFY_OTP_SIGNUP,
                &OtpRequest { session_token, otp },
            )
            .await
    }
}

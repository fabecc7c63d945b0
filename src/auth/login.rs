use super::validation::{validate_aadhaar, validate_otp};
use super::{
    accept, accept_final, single_error, AuthApi, FlowError, ResendCooldown, ValidationErrors, UNKNOWN_PHONE,
};
use crate::notice::Notice;
use std::sync::Arc;
use tracing::info;

const WELCOME_TITLE: &str = "Login Successful";
const WELCOME_MESSAGE: &str = "Welcome back to BeejSeBazaar!";

#[derive(Debug, Clone, PartialEq)]
pub enum LoginState {
    Credentials,
    OtpSent {
        session_token: String,
        sent_to: String,
    },
    Authenticated {
        user: Option<serde_json::Value>,
    },
}

/// Login by password, or by an OTP sent to the phone linked to the Aadhaar.
pub struct LoginFlow {
    api: AuthApi,
    state: LoginState,
    aadhaar: String,
    cooldown: Arc<ResendCooldown>,
}

impl LoginFlow {
    pub fn new(api: AuthApi) -> Self {
        Self {
            api,
            state: LoginState::Credentials,
            aadhaar: String::new(),
            cooldown: Arc::new(ResendCooldown::new()),
        }
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    pub fn cooldown(&self) -> &Arc<ResendCooldown> {
        &self.cooldown
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, LoginState::Authenticated { .. })
    }

    /// Ask for a login OTP for `aadhaar`.
    pub async fn send_otp(&mut self, aadhaar: &str) -> Result<Notice, FlowError> {
        single_error("aadhar", validate_aadhaar(aadhaar))?;

        let response = accept(
            self.api.login_otp(aadhaar).await,
            "Error",
            "Failed to send OTP",
        )?;
        let session_token = response
            .session_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(FlowError::NoActiveSession)?;
        let sent_to = response
            .phone
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| UNKNOWN_PHONE.to_string());

        info!("Login OTP sent to {}", sent_to);
        self.aadhaar = aadhaar.to_string();
        self.cooldown.start();
        let notice = Notice::info("OTP Sent", response.message_or(&format!("OTP sent to {}", sent_to)));
        self.state = LoginState::OtpSent {
            session_token,
            sent_to,
        };
        Ok(notice)
    }

    /// Request a fresh OTP for the Aadhaar the last one went to.
    pub async fn resend_otp(&mut self) -> Result<Notice, FlowError> {
        if !matches!(self.state, LoginState::OtpSent { .. }) {
            return Err(FlowError::NoActiveSession);
        }
        if self.cooldown.is_active() {
            return Err(FlowError::CooldownActive {
                remaining: self.cooldown.remaining(),
            });
        }
        let aadhaar = self.aadhaar.clone();
        self.send_otp(&aadhaar).await
    }

    pub async fn verify_otp(&mut self, otp: &str) -> Result<Notice, FlowError> {
        let LoginState::OtpSent { session_token, .. } = &self.state else {
            return Err(FlowError::NoActiveSession);
        };
        single_error("otp", validate_otp(otp))?;

        let response = accept_final(
            self.api.verify_login_otp(session_token, otp).await,
            "Login Failed",
            "Invalid OTP",
        )?;
        Ok(self.authenticated(response.user))
    }

    pub async fn login_with_password(
        &mut self,
        aadhaar: &str,
        password: &str,
    ) -> Result<Notice, FlowError> {
        single_error("aadhar", validate_aadhaar(aadhaar))?;
        if password.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("password", "Password is required");
            return Err(FlowError::Validation(errors));
        }

        let response = accept_final(
            self.api.login_password(aadhaar, password).await,
            "Login Failed",
            "Invalid credentials",
        )?;
        self.aadhaar = aadhaar.to_string();
        Ok(self.authenticated(response.user))
    }

    /// Back to the credentials step, dropping any OTP session.
    pub fn reset(&mut self) {
        self.state = LoginState::Credentials;
    }

    fn authenticated(&mut self, user: Option<serde_json::Value>) -> Notice {
        info!("Login successful");
        self.state = LoginState::Authenticated { user };
        Notice::info(WELCOME_TITLE, WELCOME_MESSAGE)
    }
}

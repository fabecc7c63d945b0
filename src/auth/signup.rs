use super::validation::validate_otp;
use super::{
    accept, accept_final, single_error, AuthApi, FlowError, NewUser, ResendCooldown, SignupForm,
    UNKNOWN_PHONE,
};
use crate::notice::Notice;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum SignupState {
    Details,
    OtpSent {
        session_token: String,
        sent_to: String,
    },
    Completed {
        user: Option<serde_json::Value>,
    },
}

/// Two-step account creation: details, then phone OTP confirmation.
pub struct SignupFlow {
    api: AuthApi,
    state: SignupState,
    cooldown: Arc<ResendCooldown>,
}

impl SignupFlow {
    pub fn new(api: AuthApi) -> Self {
        Self {
            api,
            state: SignupState::Details,
            cooldown: Arc::new(ResendCooldown::new()),
        }
    }

    pub fn state(&self) -> &SignupState {
        &self.state
    }

    pub fn cooldown(&self) -> &Arc<ResendCooldown> {
        &self.cooldown
    }

    /// Validate the form, create the user and send the confirmation OTP.
    pub async fn submit_details(&mut self, form: &SignupForm) -> Result<Notice, FlowError> {
        form.validate()?;

        let response = accept(
            self.api
                .create_user_send_otp(NewUser {
                    aadhaar: &form.aadhaar,
                    full_name: form.name.trim(),
                    password: &form.password,
                    state: &form.state,
                    district: &form.district,
                })
                .await,
            "Error",
            "Failed to create user",
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

        info!("Signup OTP sent to {}", sent_to);
        self.cooldown.start();
        self.state = SignupState::OtpSent {
            session_token,
            sent_to,
        };
        Ok(Notice::info(
            "User Created & OTP Sent",
            response.message_or("OTP sent"),
        ))
    }

    pub async fn resend_otp(&mut self) -> Result<Notice, FlowError> {
        let SignupState::OtpSent { session_token, .. } = &self.state else {
            return Err(FlowError::NoActiveSession);
        };
        if self.cooldown.is_active() {
            return Err(FlowError::CooldownActive {
                remaining: self.cooldown.remaining(),
            });
        }

        let response = accept(
            self.api.resend_otp(session_token).await,
            "Error",
            "Failed to resend OTP",
        )?;
        self.cooldown.start();
        Ok(Notice::info("OTP Resent", response.message_or("OTP resent")))
    }

    pub async fn verify_otp(&mut self, otp: &str) -> Result<Notice, FlowError> {
        let SignupState::OtpSent { session_token, .. } = &self.state else {
            return Err(FlowError::NoActiveSession);
        };
        single_error("otp", validate_otp(otp))?;

        let response = accept_final(
            self.api.verify_otp_signup(session_token, otp).await,
            "Signup Failed",
            "Invalid OTP",
        )?;

        info!("Account created");
        self.state = SignupState::Completed {
            user: response.user,
        };
        Ok(Notice::info(
            "Account Created",
            "Your account has been created successfully!",
        ))
    }

    /// Back to the details step.
    pub fn back(&mut self) {
        self.state = SignupState::Details;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn form() -> SignupForm {
        SignupForm {
            name: "Gurpreet Singh".to_string(),
            aadhaar: "123456789012".to_string(),
            password: "Kisan2024".to_string(),
            confirm_password: "Kisan2024".to_string(),
            state: "punjab".to_string(),
            district: "Ludhiana".to_string(),
        }
    }

    async fn mount_create_user(mock_server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/auth/create-user-send-otp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "sessionToken": "signup-1",
                "phone": "******4321",
                "message": "User created. OTP sent."
            })))
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let mut flow = SignupFlow::new(AuthApi::new(ApiClient::new(mock_server.uri())));
        let bad = SignupForm {
            confirm_password: "Different1".to_string(),
            ..form()
        };

        let err = flow.submit_details(&bad).await.unwrap_err();
        assert!(matches!(err, FlowError::Validation(_)));
        assert_eq!(flow.state(), &SignupState::Details);
    }

    #[tokio::test]
    async fn test_full_signup() {
        let mock_server = MockServer::start().await;
        mount_create_user(&mock_server).await;
        Mock::given(method("POST"))
            .and(path("/api/auth/verify-otp-signup"))
            .and(body_json(json!({"sessionToken": "signup-1", "otp": "112233"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut flow = SignupFlow::new(AuthApi::new(ApiClient::new(mock_server.uri())));

        let sent = flow.submit_details(&form()).await.unwrap();
        assert_eq!(sent, Notice::info("User Created & OTP Sent", "User created. OTP sent."));
        assert_eq!(
            flow.state(),
            &SignupState::OtpSent {
                session_token: "signup-1".to_string(),
                sent_to: "******4321".to_string(),
            }
        );

        let done = flow.verify_otp("112233").await.unwrap();
        assert_eq!(done.title, "Account Created");
        assert_eq!(flow.state(), &SignupState::Completed { user: None });
    }

    #[tokio::test]
    async fn test_resend_respects_cooldown() {
        let mock_server = MockServer::start().await;
        mount_create_user(&mock_server).await;
        Mock::given(method("POST"))
            .and(path("/api/auth/resend-otp"))
            .and(body_json(json!({"sessionToken": "signup-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "OTP resent"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut flow = SignupFlow::new(AuthApi::new(ApiClient::new(mock_server.uri())));
        flow.submit_details(&form()).await.unwrap();

        assert!(matches!(
            flow.resend_otp().await,
            Err(FlowError::CooldownActive { .. })
        ));

        while flow.cooldown().tick() > 0 {}
        let notice = flow.resend_otp().await.unwrap();
        assert_eq!(notice, Notice::info("OTP Resent", "OTP resent"));
        assert!(flow.cooldown().is_active());
    }

    #[tokio::test]
    async fn test_backend_rejection_stays_on_details() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/create-user-send-otp"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "success": false,
                "message": "User already exists"
            })))
            .mount(&mock_server)
            .await;

        let mut flow = SignupFlow::new(AuthApi::new(ApiClient::new(mock_server.uri())));
        let err = flow.submit_details(&form()).await.unwrap_err();

        assert_eq!(
            err.notice(),
            Some(Notice::destructive("Error", "User already exists"))
        );
        assert_eq!(flow.state(), &SignupState::Details);
    }

    #[tokio::test]
    async fn test_verify_failure_keeps_otp_step() {
        let mock_server = MockServer::start().await;
        mount_create_user(&mock_server).await;
        Mock::given(method("POST"))
            .and(path("/api/auth/verify-otp-signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Incorrect OTP"
            })))
            .mount(&mock_server)
            .await;

        let mut flow = SignupFlow::new(AuthApi::new(ApiClient::new(mock_server.uri())));
        flow.submit_details(&form()).await.unwrap();

        let err = flow.verify_otp("999999").await.unwrap_err();
        assert_eq!(
            err.notice(),
            Some(Notice::destructive("Signup Failed", "Incorrect OTP"))
        );
        assert!(matches!(flow.state(), SignupState::OtpSent { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_on_verify_fails_signup() {
        // Nothing listens on the discard port.
        let mut flow = SignupFlow::new(AuthApi::new(ApiClient::new("http://127.0.0.1:9")));
        flow.state = SignupState::OtpSent {
            session_token: "signup-1".to_string(),
            sent_to: UNKNOWN_PHONE.to_string(),
        };

        let err = flow.verify_otp("112233").await.unwrap_err();
        assert!(matches!(err, FlowError::Network { .. }));
        assert_eq!(
            err.notice(),
            Some(Notice::destructive(
                "Signup Failed",
                "Network error. Please try again."
            ))
        );
    }
}

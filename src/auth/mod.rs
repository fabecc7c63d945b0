//! Aadhaar-based login and signup.
//!
//! # Architecture
//!
//! - `validation`: client-side form rules
//! - `api`: typed calls to the auth endpoints
//! - `cooldown`: the OTP resend countdown
//! - `login` / `signup`: the step-by-step flows the pages drive
//!
//! Flows never render anything. Each step returns the `Notice` to show, or a
//! `FlowError` describing why the step did not advance.

mod api;
mod cooldown;
mod login;
mod signup;
pub mod validation;

pub use api::{AuthApi, AuthResponse, NewUser};
pub use cooldown::{ResendCooldown, RESEND_COOLDOWN_SECS};
pub use login::{LoginFlow, LoginState};
pub use signup::{SignupFlow, SignupState};
pub use validation::{SignupForm, ValidationErrors};

use crate::api::ApiError;
use crate::notice::Notice;
use thiserror::Error;
use tracing::warn;

/// Shown in place of a missing phone number.
pub const UNKNOWN_PHONE: &str = "your registered phone";

/// Description of the toast when a login or signup confirmation never
/// reached the backend.
pub const NETWORK_RETRY_MESSAGE: &str = "Network error. Please try again.";

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Please wait {remaining}s before requesting another OTP")]
    CooldownActive { remaining: u32 },

    #[error("No active session")]
    NoActiveSession,

    /// The backend refused the step.
    #[error("{}: {}", .notice.title, .notice.description)]
    Rejected { notice: Notice },

    #[error("Network error: {source}")]
    Network {
        #[source]
        source: ApiError,
        notice: Notice,
    },
}

impl FlowError {
    /// The toast for this failure. Validation and cooldown errors are shown
    /// inline next to the form and have none.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            FlowError::Validation(_) | FlowError::CooldownActive { .. } => None,
            FlowError::NoActiveSession => Some(Notice::destructive("Error", "No active session")),
            FlowError::Rejected { notice } | FlowError::Network { notice, .. } => {
                Some(notice.clone())
            }
        }
    }
}

impl From<ValidationErrors> for FlowError {
    fn from(errors: ValidationErrors) -> Self {
        FlowError::Validation(errors)
    }
}

/// Turn a raw auth call result into a successful response or a flow error.
///
/// `success: false` bodies and non-2xx statuses become `Rejected` with the
/// backend message, or `fallback` when it sent none. Transport failures
/// carry the generic network notice.
pub(crate) fn accept(
    result: Result<AuthResponse, ApiError>,
    title: &str,
    fallback: &str,
) -> Result<AuthResponse, FlowError> {
    accept_with(result, title, fallback, Notice::network_error())
}

/// Like [`accept`] for the step that completes a login or signup: a
/// transport failure is reported under `title` with a retry message.
pub(crate) fn accept_final(
    result: Result<AuthResponse, ApiError>,
    title: &str,
    fallback: &str,
) -> Result<AuthResponse, FlowError> {
    accept_with(
        result,
        title,
        fallback,
        Notice::destructive(title, NETWORK_RETRY_MESSAGE),
    )
}

fn accept_with(
    result: Result<AuthResponse, ApiError>,
    title: &str,
    fallback: &str,
    network_notice: Notice,
) -> Result<AuthResponse, FlowError> {
    match result {
        Ok(response) if response.success => Ok(response),
        Ok(response) => {
            warn!("{}: {}", title, response.message_or(fallback));
            Err(FlowError::Rejected {
                notice: Notice::destructive(title, response.message_or(fallback)),
            })
        }
        Err(e) if e.is_network() => {
            warn!("Auth request failed: {}", e);
            Err(FlowError::Network {
                source: e,
                notice: network_notice,
            })
        }
        Err(e) => {
            warn!("Auth request rejected: {}", e);
            Err(FlowError::Rejected {
                notice: Notice::from_api_error(&e, title, fallback),
            })
        }
    }
}

fn single_error(field: &'static str, message: Option<&'static str>) -> Result<(), FlowError> {
    let mut errors = ValidationErrors::new();
    errors.check(field, message);
    errors.into_result().map_err(FlowError::Validation)
}

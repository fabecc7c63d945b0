//! User-facing notices (toasts).
//!
//! Flows return a `Notice` instead of rendering anything; the UI decides how
//! to show it.

use crate::api::ApiError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NoticeKind::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NoticeKind::Destructive,
        }
    }

    /// Shown when a request never reached the backend.
    pub fn network_error() -> Self {
        Self::destructive("Network Error", "Please check your connection and try again.")
    }

    /// Notice for a failed call: the network notice for transport failures,
    /// otherwise `title` with the backend message (or `fallback`).
    pub fn from_api_error(error: &ApiError, title: &str, fallback: &str) -> Self {
        if error.is_network() {
            return Self::network_error();
        }
        let description = error
            .backend_message()
            .unwrap_or_else(|| fallback.to_string());
        Self::destructive(title, description)
    }

    pub fn is_destructive(&self) -> bool {
        self.kind == NoticeKind::Destructive
    }
}

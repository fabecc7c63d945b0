//! Backend access: the JSON client and the endpoint paths it is pointed at.

mod client;
pub mod endpoints;

pub use client::{ApiClient, ApiError, ApiRequest};

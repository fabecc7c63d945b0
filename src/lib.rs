//! Client-side core of the BeejSeBazaar farmer dashboard.
//!
//! HTTP access to the dashboard backend, multilingual UI state, automatic
//! translation of rendered pages, and the auth, soil, pest, weather,
//! scheme and assistant features built on top of them.

pub mod api;
pub mod assistant;
pub mod auth;
pub mod auto_translate;
pub mod config;
pub mod dom;
pub mod i18n;
pub mod notice;
pub mod pest;
pub mod schemes;
pub mod session;
pub mod soil;
pub mod storage;
pub mod weather;

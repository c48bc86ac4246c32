//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers translate JSON payloads into validated domain requests, call the
//! driving ports held in [`state::HttpState`], and map domain errors onto
//! HTTP responses via [`error`].

pub mod accounts;
pub mod error;
pub mod health;
pub mod profile;
pub mod rooms;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

//! Shared types and utilities for the PowerSchool MCP server

pub mod auth;
pub mod client;
pub mod config;
pub mod error;

pub use auth::{CachedToken, TokenCache};
pub use client::PowerSchoolClient;
pub use config::PowerSchoolConfig;
pub use error::{PowerSchoolError, Result};

pub use reqwest::Method;

//! Privacy API module.
//!
//! This module provides:
//! - HTTP client for the service and website endpoints
//! - Login and session authorization
//! - API request and response types

pub mod client;
pub mod types;

pub use client::{PrivacyApi, POSTS_PAGE_SIZE, PROFILES_PAGE_SIZE};
pub use types::*;

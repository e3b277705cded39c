//! # EWS Common Library
//!
//! Shared code for the early-warning SMS service:
//! - Database initialization and row models
//! - Configuration loading and root folder resolution
//! - Ghana phone number validation and normalization
//! - Utility functions

pub mod config;
pub mod db;
pub mod error;
pub mod phone;
pub mod uuid_utils;

pub use error::{Error, Result};

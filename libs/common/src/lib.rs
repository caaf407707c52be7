//! Common library for the Kolekt application
//!
//! This crate provides shared functionality used by the Kolekt API service,
//! including database connectivity and error handling.

pub mod database;
pub mod error;

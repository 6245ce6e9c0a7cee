//! Pitwall CLI Library
//!
//! Formula 1 session lookups over the OpenF1 API, served through a disk cache that
//! keeps answering with stale data when the API is down.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod fetch;
pub mod format;
pub mod logging;
pub mod remind;
pub mod services;

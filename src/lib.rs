//! Client library for the Employee Management System REST API
//!
//! The interesting part lives in [`api::client`]: bearer injection and
//! single-flight token refresh. Everything else is thin CRUD plumbing
//! over the server's endpoints.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

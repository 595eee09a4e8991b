//! API surface for the EMS backend
//!
//! One module per resource, all funneled through [`client::EmsClient`]
//! so every call gets bearer injection and the refresh protocol for
//! free. The modules themselves are thin: the server owns validation.

pub mod client;
pub mod departments;
pub mod employees;
pub mod error;
pub mod locations;
pub mod projects;
pub mod tasks;
pub mod users;

//! Session lifecycle, persistence, and access control
//!
//! The [`service::AuthService`] owns every mutation of the stored
//! session; the HTTP client only reads tokens from the
//! [`store::SessionStore`] it shares with the service.

pub mod access;
pub mod hash;
pub mod service;
pub mod store;
pub mod tokens;

pub use service::AuthService;
pub use store::SessionStore;
pub use tokens::Session;

//! Middleware for the web pages.

pub mod security;

pub use security::security_headers;

//! Two-step verification-code authentication core.
//!
//! A user authenticates with email and password, receives a short-lived
//! single-use numeric code by email, and exchanges that code for a signed
//! session token carrying their role. The surrounding platform (user,
//! driver, route and shift management) talks to this crate through the
//! [`services::AuthService`] orchestrator and the collaborator traits in
//! [`services::store`] and [`services::EmailProvider`].

pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod utils;

pub use config::AuthConfig;
pub use services::{AuthError, AuthService, AuthSettings};

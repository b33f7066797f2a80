//! # Auth.js Adapter Contract
//!
//! The framework-facing storage contract an Auth.js-style authentication
//! framework programs against. A storage backend crate implements
//! [`AuthAdapter`] and hands the framework users, OAuth account links,
//! sessions, verification tokens, and WebAuthn authenticators without the
//! framework knowing the backend's schema or query dialect.
//!
//! This crate is backend-agnostic: it only defines the DTO models, the
//! operation set, and the error type. See the `authjs-pocketbase` crate for
//! the PocketBase implementation.

pub mod adapter;
pub mod error;
pub mod models;

// Re-exports for convenience
pub use adapter::{AuthAdapter, SessionAndUser};
pub use error::{AdapterError, AdapterResult};
pub use models::{
    AccountType, AdapterAccount, AdapterAuthenticator, AdapterSession, AdapterUser, NewUser,
    SessionUpdate, UserUpdate, VerificationToken,
};

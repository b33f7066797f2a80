// The AuthAdapter trait — the fixed operation set of the Auth.js storage
// contract. Every storage backend implements this trait.
//
// Each operation is a stateless request/response translation; operations
// may run concurrently with no ordering guarantee or mutual exclusion.
// The per-operation not-found policy (Ok(None) vs Err) is part of the
// contract and is NOT uniform — see the table in the crate-level docs of
// the implementing backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AdapterResult;
use crate::models::{
    AdapterAccount, AdapterAuthenticator, AdapterSession, AdapterUser, NewUser, SessionUpdate,
    UserUpdate, VerificationToken,
};

/// A session paired with its owning user, as returned by
/// [`AuthAdapter::get_session_and_user`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAndUser {
    pub session: AdapterSession,
    pub user: AdapterUser,
}

/// The Auth.js storage contract.
///
/// Not-found behavior per operation:
///
/// | operation | not found |
/// |---|---|
/// | `get_user` / `get_user_by_email` / `get_user_by_account` | `Ok(None)` |
/// | `delete_user` / `get_session_and_user` / `update_session` / `delete_session` | `Ok(None)` |
/// | `create_verification_token` / `use_verification_token` / `get_account` / `get_authenticator` | `Ok(None)` |
/// | `list_authenticators_by_user_id` | `Ok(vec![])` |
/// | `unlink_account` | `Err(AccountNotFound)` |
/// | `update_authenticator_counter` | `Err(AuthenticatorNotFound)` |
#[async_trait]
pub trait AuthAdapter: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    /// Create a new user. The backend generates the id.
    async fn create_user(&self, user: NewUser) -> AdapterResult<AdapterUser>;

    /// Fetch a user by id.
    async fn get_user(&self, id: &str) -> AdapterResult<Option<AdapterUser>>;

    /// Fetch a user by email address.
    async fn get_user_by_email(&self, email: &str) -> AdapterResult<Option<AdapterUser>>;

    /// Fetch the user owning the account identified by
    /// `(provider, provider_account_id)`.
    async fn get_user_by_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<Option<AdapterUser>>;

    /// Update user fields by id. Assumes the id is valid.
    async fn update_user(&self, update: UserUpdate) -> AdapterResult<AdapterUser>;

    /// Delete a user by id, returning the deleted user.
    async fn delete_user(&self, id: &str) -> AdapterResult<Option<AdapterUser>>;

    // ─── Accounts ────────────────────────────────────────────────

    /// Link a provider account to a user. Pure create, no lookup.
    async fn link_account(&self, account: AdapterAccount) -> AdapterResult<AdapterAccount>;

    /// Remove the account identified by `(provider, provider_account_id)`,
    /// returning it. Errors with `AccountNotFound` when absent.
    async fn unlink_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<AdapterAccount>;

    /// Fetch the account identified by `(provider_account_id, provider)`.
    async fn get_account(
        &self,
        provider_account_id: &str,
        provider: &str,
    ) -> AdapterResult<Option<AdapterAccount>>;

    // ─── Sessions ────────────────────────────────────────────────

    /// Create a session. Pure create, no lookup.
    async fn create_session(&self, session: AdapterSession) -> AdapterResult<AdapterSession>;

    /// Fetch a session by token together with its user.
    async fn get_session_and_user(
        &self,
        session_token: &str,
    ) -> AdapterResult<Option<SessionAndUser>>;

    /// Update a session resolved by its token.
    async fn update_session(&self, update: SessionUpdate)
        -> AdapterResult<Option<AdapterSession>>;

    /// Delete a session by token, returning it. Absent tokens yield
    /// `Ok(None)`, never an error.
    async fn delete_session(&self, session_token: &str)
        -> AdapterResult<Option<AdapterSession>>;

    // ─── Verification tokens ─────────────────────────────────────

    /// Store a verification token. Any failure yields `Ok(None)`.
    async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> AdapterResult<Option<VerificationToken>>;

    /// Consume a verification token: look it up by `(identifier, token)`,
    /// delete it server-side, and return it — unless it is absent or
    /// expired, in which case `Ok(None)`.
    async fn use_verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> AdapterResult<Option<VerificationToken>>;

    // ─── Authenticators ──────────────────────────────────────────

    /// Store a WebAuthn authenticator. Pure create, no lookup.
    async fn create_authenticator(
        &self,
        authenticator: AdapterAuthenticator,
    ) -> AdapterResult<AdapterAuthenticator>;

    /// Fetch an authenticator by credential id.
    async fn get_authenticator(
        &self,
        credential_id: &str,
    ) -> AdapterResult<Option<AdapterAuthenticator>>;

    /// List all authenticators belonging to a user. Empty when none.
    async fn list_authenticators_by_user_id(
        &self,
        user_id: &str,
    ) -> AdapterResult<Vec<AdapterAuthenticator>>;

    /// Set the signature counter of an authenticator resolved by credential
    /// id. Errors with `AuthenticatorNotFound` when absent.
    async fn update_authenticator_counter(
        &self,
        credential_id: &str,
        counter: i64,
    ) -> AdapterResult<AdapterAuthenticator>;
}

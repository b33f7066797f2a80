// Adapter error type shared by all storage backends.
//
// The operation set distinguishes "entity absent" (Ok(None)) from
// "operation invalid" (Err). Only the two named not-found errors below are
// ever raised for a missing entity; everything else is either a
// configuration problem, a malformed backend record, or a backend failure
// passed through unmodified.

use thiserror::Error;

/// Errors raised by storage adapter operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Invalid adapter configuration, detected before any network call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `unlink_account` found no matching account.
    #[error("Account not found")]
    AccountNotFound,

    /// `update_authenticator_counter` found no matching authenticator.
    #[error("Authenticator not found")]
    AuthenticatorNotFound,

    /// A relation field that must hold at least one foreign id was empty.
    /// Raised instead of silently indexing an empty list.
    #[error("empty relation `{field}` on {collection} record {id}")]
    MissingRelation {
        collection: String,
        field: String,
        id: String,
    },

    /// The backend returned a record the mapping layer cannot interpret.
    #[error("malformed backend record: {0}")]
    Malformed(String),

    /// A backend call failed for a reason other than the explicit
    /// not-found cases. Propagated unmodified — no retry, no
    /// classification.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl AdapterError {
    /// Shorthand for a missing-relation error.
    pub fn missing_relation(
        collection: impl Into<String>,
        field: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self::MissingRelation {
            collection: collection.into(),
            field: field.into(),
            id: id.into(),
        }
    }
}

/// Result type for adapter operations.
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

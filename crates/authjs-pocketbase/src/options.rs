// Adapter configuration surface.

use pocketbase_client::PocketBase;

/// A static header attached to every outgoing backend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

impl HeaderPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Options for constructing a [`PocketbaseAdapter`] from a client handle.
///
/// When `requires_auth` is true, `headers` is mandatory; construction fails
/// with a configuration error before any network call otherwise.
///
/// [`PocketbaseAdapter`]: crate::PocketbaseAdapter
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// The PocketBase client handle to wrap.
    pub client: PocketBase,

    /// Whether the backend requires an authentication header.
    pub requires_auth: bool,

    /// The header pair injected into every request when `requires_auth`.
    pub headers: Option<HeaderPair>,
}

impl AdapterOptions {
    /// Options for an unauthenticated backend.
    pub fn new(client: PocketBase) -> Self {
        Self {
            client,
            requires_auth: false,
            headers: None,
        }
    }

    /// Options for an authenticated backend.
    pub fn with_auth(client: PocketBase, headers: HeaderPair) -> Self {
        Self {
            client,
            requires_auth: true,
            headers: Some(headers),
        }
    }
}

// PocketbaseAdapter — concrete implementation of the AuthAdapter trait on
// top of the PocketBase record API.
//
// Every operation is one of two templates:
// - single-call fetch-or-mutate against a named collection;
// - lookup by filter, then act on the resolved record id.
//
// The not-found policy is per-operation, not uniform: most reads translate
// a miss (or any backend failure on the catch-all paths) into Ok(None),
// while unlink_account and update_authenticator_counter raise their named
// errors. The consuming framework depends on that asymmetry.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use authjs_adapter::{
    AdapterAccount, AdapterAuthenticator, AdapterError, AdapterResult, AdapterSession,
    AdapterUser, AuthAdapter, NewUser, SessionAndUser, SessionUpdate, UserUpdate,
    VerificationToken,
};
use pocketbase_client::{ClientError, Filter, PocketBase, RecordStore};

use crate::options::AdapterOptions;
use crate::record::{
    account_fields, account_from_record, authenticator_fields, authenticator_from_record,
    collections, record_id, session_fields, session_from_record, session_update_fields,
    user_fields_from_new, user_fields_from_update, user_from_record, verification_fields,
    verification_from_record,
};

/// Batch size for the authenticator full-list query.
const LIST_BATCH: u32 = 200;

/// PocketBase storage adapter.
///
/// Generic over the record store so tests can run against an in-memory
/// backend; production code wraps a [`PocketBase`] client handle.
#[derive(Debug, Clone)]
pub struct PocketbaseAdapter<S = PocketBase> {
    store: S,
    debug_logs: bool,
}

impl PocketbaseAdapter<PocketBase> {
    /// Wrap a ready-made client handle (no authentication header).
    pub fn new(client: PocketBase) -> Self {
        Self::with_store(client)
    }

    /// Construct from options, installing the static authentication header
    /// on the client when required.
    ///
    /// Fails with a configuration error — before any network call — when
    /// `requires_auth` is set but no header pair is given.
    pub fn from_options(options: AdapterOptions) -> AdapterResult<Self> {
        let AdapterOptions {
            client,
            requires_auth,
            headers,
        } = options;

        let client = if requires_auth {
            let header = headers.ok_or_else(|| {
                AdapterError::Config("missing headers for authenticated client".into())
            })?;
            client.with_static_header(&header.name, &header.value)
        } else {
            client
        };

        Ok(Self::with_store(client))
    }
}

impl<S: RecordStore> PocketbaseAdapter<S> {
    /// Build an adapter over any record store implementation.
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            debug_logs: false,
        }
    }

    /// Enable per-operation debug logging.
    pub fn debug_logs(mut self, enabled: bool) -> Self {
        self.debug_logs = enabled;
        self
    }

    /// The wrapped record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn debug(&self, op: &str, collection: &str) {
        if self.debug_logs {
            tracing::debug!("[Pocketbase Adapter] {} on '{}'", op, collection);
        }
    }
}

/// Backend failures outside the explicit not-found cases pass through
/// unmodified, wrapped only in the adapter error type.
fn backend(err: ClientError) -> AdapterError {
    AdapterError::Backend(err.to_string())
}

fn account_filter(provider: &str, provider_account_id: &str) -> Filter {
    Filter::eq("account_provider_account_id", provider_account_id)
        .and_eq("account_provider", provider)
}

#[async_trait]
impl<S: RecordStore> AuthAdapter for PocketbaseAdapter<S> {
    // ─── Users ───────────────────────────────────────────────────

    async fn create_user(&self, user: NewUser) -> AdapterResult<AdapterUser> {
        self.debug("CREATE", collections::USERS);
        let record = self
            .store
            .create(collections::USERS, user_fields_from_new(&user))
            .await
            .map_err(backend)?;
        user_from_record(&record)
    }

    async fn get_user(&self, id: &str) -> AdapterResult<Option<AdapterUser>> {
        self.debug("GET_ONE", collections::USERS);
        match self.store.get_one(collections::USERS, id).await {
            Ok(record) => Ok(Some(user_from_record(&record)?)),
            Err(_) => Ok(None),
        }
    }

    async fn get_user_by_email(&self, email: &str) -> AdapterResult<Option<AdapterUser>> {
        self.debug("GET_FIRST", collections::USERS);
        let filter = Filter::eq("user_email", email);
        match self
            .store
            .get_first_list_item(collections::USERS, &filter)
            .await
        {
            Ok(record) => Ok(Some(user_from_record(&record)?)),
            Err(_) => Ok(None),
        }
    }

    async fn get_user_by_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<Option<AdapterUser>> {
        self.debug("GET_LIST", collections::ACCOUNTS);
        let filter = account_filter(provider, provider_account_id);
        let page = match self.store.get_list(collections::ACCOUNTS, 1, 1, &filter).await {
            Ok(page) => page,
            Err(_) => return Ok(None),
        };
        let Some(account) = page.items.into_iter().next() else {
            return Ok(None);
        };

        let user_id = crate::record::relation_first(
            &account,
            collections::ACCOUNTS,
            "account_user_id",
        )?;

        match self.store.get_one(collections::USERS, &user_id).await {
            Ok(record) => Ok(Some(user_from_record(&record)?)),
            Err(_) => Ok(None),
        }
    }

    async fn update_user(&self, update: UserUpdate) -> AdapterResult<AdapterUser> {
        self.debug("UPDATE", collections::USERS);
        let record = self
            .store
            .update(
                collections::USERS,
                &update.id,
                user_fields_from_update(&update),
            )
            .await
            .map_err(backend)?;
        user_from_record(&record)
    }

    async fn delete_user(&self, id: &str) -> AdapterResult<Option<AdapterUser>> {
        self.debug("DELETE", collections::USERS);
        let record = match self.store.get_one(collections::USERS, id).await {
            Ok(record) => record,
            Err(_) => return Ok(None),
        };
        let user = user_from_record(&record)?;

        match self.store.delete(collections::USERS, id).await {
            Ok(()) => Ok(Some(user)),
            Err(_) => Ok(None),
        }
    }

    // ─── Accounts ────────────────────────────────────────────────

    async fn link_account(&self, account: AdapterAccount) -> AdapterResult<AdapterAccount> {
        self.debug("CREATE", collections::ACCOUNTS);
        self.store
            .create(collections::ACCOUNTS, account_fields(&account))
            .await
            .map_err(backend)?;
        Ok(account)
    }

    async fn unlink_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> AdapterResult<AdapterAccount> {
        self.debug("GET_FIRST", collections::ACCOUNTS);
        let filter = account_filter(provider, provider_account_id);
        let record = self
            .store
            .get_first_list_item(collections::ACCOUNTS, &filter)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    AdapterError::AccountNotFound
                } else {
                    backend(e)
                }
            })?;

        let account = account_from_record(&record)?;
        let id = record_id(&record)?;

        self.debug("DELETE", collections::ACCOUNTS);
        self.store
            .delete(collections::ACCOUNTS, &id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    AdapterError::AccountNotFound
                } else {
                    backend(e)
                }
            })?;

        Ok(account)
    }

    async fn get_account(
        &self,
        provider_account_id: &str,
        provider: &str,
    ) -> AdapterResult<Option<AdapterAccount>> {
        self.debug("GET_FIRST", collections::ACCOUNTS);
        let filter = account_filter(provider, provider_account_id);
        match self
            .store
            .get_first_list_item(collections::ACCOUNTS, &filter)
            .await
        {
            Ok(record) => Ok(Some(account_from_record(&record)?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(backend(e)),
        }
    }

    // ─── Sessions ────────────────────────────────────────────────

    async fn create_session(&self, session: AdapterSession) -> AdapterResult<AdapterSession> {
        self.debug("CREATE", collections::SESSIONS);
        let record = self
            .store
            .create(collections::SESSIONS, session_fields(&session))
            .await
            .map_err(backend)?;
        session_from_record(&record)
    }

    async fn get_session_and_user(
        &self,
        session_token: &str,
    ) -> AdapterResult<Option<SessionAndUser>> {
        self.debug("GET_FIRST", collections::SESSIONS);
        let filter = Filter::eq("session_session_token", session_token);
        let record = match self
            .store
            .get_first_list_item(collections::SESSIONS, &filter)
            .await
        {
            Ok(record) => record,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(backend(e)),
        };

        let session = session_from_record(&record)?;

        let user_record = self
            .store
            .get_one(collections::USERS, &session.user_id)
            .await
            .map_err(backend)?;
        let user = user_from_record(&user_record)?;

        Ok(Some(SessionAndUser { session, user }))
    }

    async fn update_session(
        &self,
        update: SessionUpdate,
    ) -> AdapterResult<Option<AdapterSession>> {
        self.debug("GET_FIRST", collections::SESSIONS);
        let filter = Filter::eq("session_session_token", &*update.session_token);
        let record = match self
            .store
            .get_first_list_item(collections::SESSIONS, &filter)
            .await
        {
            Ok(record) => record,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(backend(e)),
        };
        let id = record_id(&record)?;

        self.debug("UPDATE", collections::SESSIONS);
        let updated = self
            .store
            .update(collections::SESSIONS, &id, session_update_fields(&update))
            .await
            .map_err(backend)?;

        Ok(Some(session_from_record(&updated)?))
    }

    async fn delete_session(
        &self,
        session_token: &str,
    ) -> AdapterResult<Option<AdapterSession>> {
        self.debug("GET_FIRST", collections::SESSIONS);
        let filter = Filter::eq("session_session_token", session_token);
        let record = match self
            .store
            .get_first_list_item(collections::SESSIONS, &filter)
            .await
        {
            Ok(record) => record,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(backend(e)),
        };

        let session = session_from_record(&record)?;
        let id = record_id(&record)?;

        self.debug("DELETE", collections::SESSIONS);
        match self.store.delete(collections::SESSIONS, &id).await {
            Ok(()) => Ok(Some(session)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(backend(e)),
        }
    }

    // ─── Verification tokens ─────────────────────────────────────

    async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> AdapterResult<Option<VerificationToken>> {
        self.debug("CREATE", collections::VERIFICATION_TOKENS);
        let record = match self
            .store
            .create(collections::VERIFICATION_TOKENS, verification_fields(&token))
            .await
        {
            Ok(record) => record,
            Err(_) => return Ok(None),
        };

        // Any failure on this path reads as absent.
        Ok(verification_from_record(&record).ok())
    }

    async fn use_verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> AdapterResult<Option<VerificationToken>> {
        self.debug("GET_FIRST", collections::VERIFICATION_TOKENS);
        let filter =
            Filter::eq("verification_identifier", identifier).and_eq("verification_token", token);
        let record = match self
            .store
            .get_first_list_item(collections::VERIFICATION_TOKENS, &filter)
            .await
        {
            Ok(record) => record,
            Err(_) => return Ok(None),
        };

        let Ok(found) = verification_from_record(&record) else {
            return Ok(None);
        };
        let Ok(id) = record_id(&record) else {
            return Ok(None);
        };

        // Single-use: the record is consumed server-side whether or not it
        // is still valid.
        self.debug("DELETE", collections::VERIFICATION_TOKENS);
        if self
            .store
            .delete(collections::VERIFICATION_TOKENS, &id)
            .await
            .is_err()
        {
            return Ok(None);
        }

        if found.expires < Utc::now() {
            return Ok(None);
        }

        Ok(Some(found))
    }

    // ─── Authenticators ──────────────────────────────────────────

    async fn create_authenticator(
        &self,
        authenticator: AdapterAuthenticator,
    ) -> AdapterResult<AdapterAuthenticator> {
        self.debug("CREATE", collections::AUTHENTICATORS);
        let record = self
            .store
            .create(
                collections::AUTHENTICATORS,
                authenticator_fields(&authenticator),
            )
            .await
            .map_err(backend)?;
        authenticator_from_record(&record)
    }

    async fn get_authenticator(
        &self,
        credential_id: &str,
    ) -> AdapterResult<Option<AdapterAuthenticator>> {
        self.debug("GET_FIRST", collections::AUTHENTICATORS);
        let filter = Filter::eq("authenticator_credential_id", credential_id);
        match self
            .store
            .get_first_list_item(collections::AUTHENTICATORS, &filter)
            .await
        {
            Ok(record) => Ok(Some(authenticator_from_record(&record)?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(backend(e)),
        }
    }

    async fn list_authenticators_by_user_id(
        &self,
        user_id: &str,
    ) -> AdapterResult<Vec<AdapterAuthenticator>> {
        self.debug("GET_FULL_LIST", collections::AUTHENTICATORS);
        let filter = Filter::eq("authenticator_user_id", user_id);
        let records = self
            .store
            .get_full_list(collections::AUTHENTICATORS, LIST_BATCH, &filter)
            .await
            .map_err(backend)?;

        records.iter().map(authenticator_from_record).collect()
    }

    async fn update_authenticator_counter(
        &self,
        credential_id: &str,
        counter: i64,
    ) -> AdapterResult<AdapterAuthenticator> {
        self.debug("GET_FIRST", collections::AUTHENTICATORS);
        let filter = Filter::eq("authenticator_credential_id", credential_id);
        let record = self
            .store
            .get_first_list_item(collections::AUTHENTICATORS, &filter)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    AdapterError::AuthenticatorNotFound
                } else {
                    backend(e)
                }
            })?;
        let id = record_id(&record)?;

        self.debug("UPDATE", collections::AUTHENTICATORS);
        let updated = self
            .store
            .update(
                collections::AUTHENTICATORS,
                &id,
                json!({ "authenticator_counter": counter }),
            )
            .await
            .map_err(backend)?;

        authenticator_from_record(&updated)
    }
}

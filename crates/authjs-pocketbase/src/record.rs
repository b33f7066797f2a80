// Collection schema mapping — converts between framework DTOs and the
// backend's prefixed record fields.
//
// Every stored field carries its collection prefix (`user_email`,
// `session_session_token`, ...). Relation fields hold a foreign id and may
// come back from the backend as a single-element list or a bare scalar;
// `relation_first` is the one place that unwraps them, and an empty list is
// a data-integrity error rather than a silent index.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use authjs_adapter::{
    AdapterAccount, AdapterAuthenticator, AdapterError, AdapterResult, AdapterSession,
    AdapterUser, NewUser, SessionUpdate, UserUpdate, VerificationToken,
};

/// Backend collection names.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ACCOUNTS: &str = "accounts";
    pub const SESSIONS: &str = "sessions";
    pub const VERIFICATION_TOKENS: &str = "verification_tokens";
    pub const AUTHENTICATORS: &str = "authenticators";
}

// ─── Field helpers ───────────────────────────────────────────────

fn str_field(record: &Value, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Absent and empty strings both read as `None` — the backend returns `""`
/// for unset text fields.
fn opt_str_field(record: &Value, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The backend-generated record id.
pub fn record_id(record: &Value) -> AdapterResult<String> {
    record
        .get("id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AdapterError::Malformed("record has no id".into()))
}

/// Unwrap a relation field to its first foreign id.
///
/// Accepts a non-empty list (the backend's multi-relation shape) or a bare
/// scalar (single-relation collapse). An empty or missing relation is a
/// [`AdapterError::MissingRelation`].
pub fn relation_first(record: &Value, collection: &str, field: &str) -> AdapterResult<String> {
    let missing = || {
        AdapterError::missing_relation(
            collection,
            field,
            record
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("<unknown>"),
        )
    };

    match record.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Array(items)) => items
            .first()
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(missing),
        _ => Err(missing()),
    }
}

// ─── Timestamps ──────────────────────────────────────────────────

/// RFC 3339 with milliseconds, the form the backend accepts on writes.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp. The backend emits either RFC 3339 or its
/// space-separated UTC form (`2024-01-01 00:00:00.000Z`).
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(&raw.replacen(' ', "T", 1)))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn opt_datetime(record: &Value, field: &str) -> Option<DateTime<Utc>> {
    record
        .get(field)
        .and_then(Value::as_str)
        .and_then(parse_datetime)
}

fn required_datetime(record: &Value, field: &str) -> AdapterResult<DateTime<Utc>> {
    opt_datetime(record, field)
        .ok_or_else(|| AdapterError::Malformed(format!("missing or unparseable `{field}`")))
}

// ─── Users ───────────────────────────────────────────────────────

pub fn user_fields_from_new(user: &NewUser) -> Value {
    let mut fields = Map::new();
    fields.insert("user_email".into(), Value::String(user.email.clone()));
    if let Some(dt) = &user.email_verified {
        fields.insert(
            "user_email_verified".into(),
            Value::String(format_datetime(dt)),
        );
    }
    if let Some(image) = &user.image {
        fields.insert("user_image".into(), Value::String(image.clone()));
    }
    if let Some(name) = &user.name {
        fields.insert("user_name".into(), Value::String(name.clone()));
    }
    Value::Object(fields)
}

/// Only the fields present on the update are sent; `None` leaves the stored
/// value untouched.
pub fn user_fields_from_update(update: &UserUpdate) -> Value {
    let mut fields = Map::new();
    if let Some(email) = &update.email {
        fields.insert("user_email".into(), Value::String(email.clone()));
    }
    if let Some(dt) = &update.email_verified {
        fields.insert(
            "user_email_verified".into(),
            Value::String(format_datetime(dt)),
        );
    }
    if let Some(image) = &update.image {
        fields.insert("user_image".into(), Value::String(image.clone()));
    }
    if let Some(name) = &update.name {
        fields.insert("user_name".into(), Value::String(name.clone()));
    }
    Value::Object(fields)
}

pub fn user_from_record(record: &Value) -> AdapterResult<AdapterUser> {
    Ok(AdapterUser {
        id: record_id(record)?,
        name: opt_str_field(record, "user_name"),
        email: str_field(record, "user_email"),
        email_verified: opt_datetime(record, "user_email_verified"),
        image: opt_str_field(record, "user_image"),
    })
}

// ─── Accounts ────────────────────────────────────────────────────

pub fn account_fields(account: &AdapterAccount) -> Value {
    let mut fields = Map::new();
    fields.insert(
        "account_provider_account_id".into(),
        Value::String(account.provider_account_id.clone()),
    );
    if let Some(provider_id) = &account.provider_id {
        fields.insert(
            "account_provider_id".into(),
            Value::String(provider_id.clone()),
        );
    }
    fields.insert(
        "account_user_id".into(),
        Value::String(account.user_id.clone()),
    );
    fields.insert(
        "account_type".into(),
        Value::String(account.account_type.as_str().into()),
    );
    fields.insert(
        "account_provider".into(),
        Value::String(account.provider.clone()),
    );
    Value::Object(fields)
}

pub fn account_from_record(record: &Value) -> AdapterResult<AdapterAccount> {
    let raw_type = str_field(record, "account_type");
    let account_type = raw_type
        .parse()
        .map_err(|e: String| AdapterError::Malformed(e))?;

    Ok(AdapterAccount {
        user_id: relation_first(record, collections::ACCOUNTS, "account_user_id")?,
        account_type,
        provider: str_field(record, "account_provider"),
        provider_account_id: str_field(record, "account_provider_account_id"),
        provider_id: opt_str_field(record, "account_provider_id"),
    })
}

// ─── Sessions ────────────────────────────────────────────────────

pub fn session_fields(session: &AdapterSession) -> Value {
    let mut fields = Map::new();
    fields.insert(
        "session_expires".into(),
        Value::String(format_datetime(&session.expires)),
    );
    fields.insert(
        "session_session_token".into(),
        Value::String(session.session_token.clone()),
    );
    fields.insert(
        "session_user_id".into(),
        Value::String(session.user_id.clone()),
    );
    Value::Object(fields)
}

pub fn session_update_fields(update: &SessionUpdate) -> Value {
    let mut fields = Map::new();
    fields.insert(
        "session_session_token".into(),
        Value::String(update.session_token.clone()),
    );
    if let Some(expires) = &update.expires {
        fields.insert(
            "session_expires".into(),
            Value::String(format_datetime(expires)),
        );
    }
    if let Some(user_id) = &update.user_id {
        fields.insert("session_user_id".into(), Value::String(user_id.clone()));
    }
    Value::Object(fields)
}

pub fn session_from_record(record: &Value) -> AdapterResult<AdapterSession> {
    Ok(AdapterSession {
        session_token: str_field(record, "session_session_token"),
        user_id: relation_first(record, collections::SESSIONS, "session_user_id")?,
        expires: required_datetime(record, "session_expires")?,
    })
}

// ─── Verification tokens ─────────────────────────────────────────

pub fn verification_fields(token: &VerificationToken) -> Value {
    let mut fields = Map::new();
    fields.insert(
        "verification_identifier".into(),
        Value::String(token.identifier.clone()),
    );
    fields.insert(
        "verification_token".into(),
        Value::String(token.token.clone()),
    );
    fields.insert(
        "verification_expires".into(),
        Value::String(format_datetime(&token.expires)),
    );
    Value::Object(fields)
}

pub fn verification_from_record(record: &Value) -> AdapterResult<VerificationToken> {
    Ok(VerificationToken {
        identifier: str_field(record, "verification_identifier"),
        token: str_field(record, "verification_token"),
        expires: required_datetime(record, "verification_expires")?,
    })
}

// ─── Authenticators ──────────────────────────────────────────────

pub fn authenticator_fields(authenticator: &AdapterAuthenticator) -> Value {
    let mut fields = Map::new();
    fields.insert(
        "authenticator_credential_id".into(),
        Value::String(authenticator.credential_id.clone()),
    );
    fields.insert(
        "authenticator_user_id".into(),
        Value::String(authenticator.user_id.clone()),
    );
    fields.insert(
        "authenticator_provider_account_id".into(),
        Value::String(authenticator.provider_account_id.clone()),
    );
    fields.insert(
        "authenticator_credential_public_key".into(),
        Value::String(authenticator.credential_public_key.clone()),
    );
    fields.insert(
        "authenticator_counter".into(),
        Value::from(authenticator.counter),
    );
    fields.insert(
        "authenticator_credential_device_type".into(),
        Value::String(authenticator.credential_device_type.clone()),
    );
    fields.insert(
        "authenticator_credential_backed_up".into(),
        Value::Bool(authenticator.credential_backed_up),
    );
    if let Some(transports) = &authenticator.transports {
        fields.insert(
            "authenticator_transports".into(),
            Value::String(transports.clone()),
        );
    }
    Value::Object(fields)
}

pub fn authenticator_from_record(record: &Value) -> AdapterResult<AdapterAuthenticator> {
    Ok(AdapterAuthenticator {
        credential_id: str_field(record, "authenticator_credential_id"),
        user_id: relation_first(record, collections::AUTHENTICATORS, "authenticator_user_id")?,
        provider_account_id: str_field(record, "authenticator_provider_account_id"),
        credential_public_key: str_field(record, "authenticator_credential_public_key"),
        counter: record
            .get("authenticator_counter")
            .and_then(Value::as_i64)
            .unwrap_or(0),
        credential_device_type: str_field(record, "authenticator_credential_device_type"),
        credential_backed_up: record
            .get("authenticator_credential_backed_up")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        transports: opt_str_field(record, "authenticator_transports"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_relation_first_unwraps_list() {
        let record = json!({"id": "s1", "session_user_id": ["u1"]});
        let id = relation_first(&record, "sessions", "session_user_id").unwrap();
        assert_eq!(id, "u1");
    }

    #[test]
    fn test_relation_first_accepts_scalar() {
        let record = json!({"id": "s1", "session_user_id": "u1"});
        let id = relation_first(&record, "sessions", "session_user_id").unwrap();
        assert_eq!(id, "u1");
    }

    #[test]
    fn test_relation_first_rejects_empty_list() {
        let record = json!({"id": "s1", "session_user_id": []});
        let err = relation_first(&record, "sessions", "session_user_id").unwrap_err();
        assert!(matches!(err, AdapterError::MissingRelation { .. }));
        assert!(err.to_string().contains("session_user_id"));
    }

    #[test]
    fn test_relation_first_rejects_missing_field() {
        let record = json!({"id": "s1"});
        assert!(relation_first(&record, "sessions", "session_user_id").is_err());
    }

    #[test]
    fn test_parse_datetime_both_forms() {
        let rfc = parse_datetime("2024-06-01T12:00:00.000Z").unwrap();
        let spaced = parse_datetime("2024-06-01 12:00:00.000Z").unwrap();
        assert_eq!(rfc, spaced);
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("not a date").is_none());
    }

    #[test]
    fn test_user_round_trip() {
        let verified = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let new_user = NewUser {
            name: Some("Alice".into()),
            email: "alice@example.com".into(),
            email_verified: Some(verified),
            image: None,
        };

        let mut record = user_fields_from_new(&new_user);
        record
            .as_object_mut()
            .unwrap()
            .insert("id".into(), json!("u1"));

        let user = user_from_record(&record).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.name.as_deref(), Some("Alice"));
        assert_eq!(user.email_verified, Some(verified));
        assert!(user.image.is_none());
    }

    #[test]
    fn test_user_unverified_email_reads_as_none() {
        // The backend returns "" for unset date fields.
        let record = json!({"id": "u1", "user_email": "x@y.z", "user_email_verified": ""});
        let user = user_from_record(&record).unwrap();
        assert!(user.email_verified.is_none());
    }

    #[test]
    fn test_update_fields_skip_absent() {
        let update = UserUpdate {
            id: "u1".into(),
            name: Some("New Name".into()),
            ..Default::default()
        };
        let fields = user_fields_from_update(&update);
        let obj = fields.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["user_name"], "New Name");
    }

    #[test]
    fn test_account_round_trip() {
        let account = AdapterAccount {
            user_id: "u1".into(),
            account_type: authjs_adapter::AccountType::OAuth,
            provider: "github".into(),
            provider_account_id: "gh-42".into(),
            provider_id: None,
        };

        let mut record = account_fields(&account);
        record
            .as_object_mut()
            .unwrap()
            .insert("id".into(), json!("acc1"));

        let mapped = account_from_record(&record).unwrap();
        assert_eq!(mapped, account);
    }

    #[test]
    fn test_account_unknown_type_is_malformed() {
        let record = json!({
            "id": "acc1",
            "account_user_id": ["u1"],
            "account_type": "saml",
            "account_provider": "x",
            "account_provider_account_id": "y",
        });
        let err = account_from_record(&record).unwrap_err();
        assert!(matches!(err, AdapterError::Malformed(_)));
    }

    #[test]
    fn test_session_requires_expiry() {
        let record = json!({
            "id": "s1",
            "session_session_token": "tok",
            "session_user_id": ["u1"],
        });
        assert!(session_from_record(&record).is_err());
    }

    #[test]
    fn test_authenticator_round_trip_with_relation_list() {
        let record = json!({
            "id": "rec1",
            "authenticator_credential_id": "cred-1",
            "authenticator_user_id": ["u1"],
            "authenticator_provider_account_id": "pa-1",
            "authenticator_credential_public_key": "pk",
            "authenticator_counter": 9,
            "authenticator_credential_device_type": "multiDevice",
            "authenticator_credential_backed_up": true,
            "authenticator_transports": "internal",
        });
        let authenticator = authenticator_from_record(&record).unwrap();
        assert_eq!(authenticator.credential_id, "cred-1");
        assert_eq!(authenticator.user_id, "u1");
        assert_eq!(authenticator.counter, 9);
        assert!(authenticator.credential_backed_up);
        assert_eq!(authenticator.transports.as_deref(), Some("internal"));
    }
}

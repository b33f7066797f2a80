// Framework-facing DTOs for the Auth.js storage contract.
//
// Shapes match the `AdapterUser` / `AdapterAccount` / `AdapterSession` /
// `VerificationToken` / `AdapterAuthenticator` types from `@auth/core/adapters`.
// Serialized field names use the framework's camelCase convention.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user as seen by the authentication framework.
///
/// `id` is always backend-generated; callers never supply it (see [`NewUser`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterUser {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    /// Timestamp of email verification, or `None` when unverified.
    pub email_verified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Input for `create_user`. Deliberately has no `id` field — the backend
/// generates record ids and any caller-supplied id would be discarded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub email_verified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Partial update for `update_user`. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Auth.js account type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    OAuth,
    Oidc,
    Email,
    Webauthn,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OAuth => "oauth",
            Self::Oidc => "oidc",
            Self::Email => "email",
            Self::Webauthn => "webauthn",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oauth" => Ok(Self::OAuth),
            "oidc" => Ok(Self::Oidc),
            "email" => Ok(Self::Email),
            "webauthn" => Ok(Self::Webauthn),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// A provider account linked to a user.
///
/// Compound-unique on `(provider, provider_account_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterAccount {
    pub user_id: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub provider: String,
    pub provider_account_id: String,
    /// Legacy provider id carried by some framework versions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

/// A database session. Unique on `session_token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterSession {
    pub session_token: String,
    pub user_id: String,
    pub expires: DateTime<Utc>,
}

/// Partial update for `update_session`, keyed by `session_token`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub session_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

/// A single-use, time-bounded verification token.
///
/// Unique on `(identifier, token)`; deleted on consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationToken {
    pub identifier: String,
    pub token: String,
    pub expires: DateTime<Utc>,
}

/// A WebAuthn credential record. Unique on `credential_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterAuthenticator {
    #[serde(rename = "credentialID")]
    pub credential_id: String,
    pub user_id: String,
    pub provider_account_id: String,
    pub credential_public_key: String,
    pub counter: i64,
    pub credential_device_type: String,
    pub credential_backed_up: bool,
    /// Comma-joined transport hints (e.g. `"usb,nfc"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transports: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_user_serializes_camel_case() {
        let user = AdapterUser {
            id: "u1".into(),
            name: Some("Alice".into()),
            email: "alice@example.com".into(),
            email_verified: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            image: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "alice@example.com");
        assert!(json["emailVerified"].is_string());
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_account_type_round_trip() {
        for ty in [
            AccountType::OAuth,
            AccountType::Oidc,
            AccountType::Email,
            AccountType::Webauthn,
        ] {
            let parsed: AccountType = ty.as_str().parse().unwrap();
            assert_eq!(parsed, ty);
        }
        assert!("saml".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_account_type_field_renamed() {
        let account = AdapterAccount {
            user_id: "u1".into(),
            account_type: AccountType::OAuth,
            provider: "github".into(),
            provider_account_id: "gh-42".into(),
            provider_id: None,
        };
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["type"], "oauth");
        assert_eq!(json["providerAccountId"], "gh-42");
    }

    #[test]
    fn test_authenticator_credential_id_rename() {
        let authenticator = AdapterAuthenticator {
            credential_id: "cred-1".into(),
            user_id: "u1".into(),
            provider_account_id: "pa-1".into(),
            credential_public_key: "pk".into(),
            counter: 3,
            credential_device_type: "singleDevice".into(),
            credential_backed_up: false,
            transports: Some("usb,nfc".into()),
        };
        let json = serde_json::to_value(&authenticator).unwrap();
        // Auth.js spells this one with a capitalized suffix.
        assert_eq!(json["credentialID"], "cred-1");
        assert_eq!(json["credentialDeviceType"], "singleDevice");
    }

    #[test]
    fn test_session_deserializes() {
        let json = serde_json::json!({
            "sessionToken": "tok-1",
            "userId": "u1",
            "expires": "2024-06-01T00:00:00Z",
        });
        let session: AdapterSession = serde_json::from_value(json).unwrap();
        assert_eq!(session.session_token, "tok-1");
        assert_eq!(session.user_id, "u1");
    }
}

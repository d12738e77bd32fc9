//! Actor data model (users and captains).
//!
//! Two shapes live here: inputs accepted at registration ([`Registration`],
//! [`NewActor`]) and the output-safe projection ([`ActorView`]) returned to
//! callers. `ActorView` has no password field at all, so a hash can never be
//! serialized by accident.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ridegate_core::{ActorId, DomainError};

use crate::{PasswordHash, Role};

// ─────────────────────────────────────────────────────────────────────────────
// Email
// ─────────────────────────────────────────────────────────────────────────────

/// Normalized (trimmed, lower-cased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse an email of the shape `local@domain.tld`.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();
        if is_email_shaped(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(DomainError::validation("invalid email address"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn is_email_shaped(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    let clean = |part: &str| !part.is_empty() && !part.chars().any(|c| c == '@' || c.is_whitespace());
    if !clean(local) || !clean(domain) {
        return false;
    }
    // Needs a dot with at least one character on each side.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared attributes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullName {
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Captain attributes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleType {
    TwoWheeler,
    ThreeWheeler,
    FourWheeler,
}

impl VehicleType {
    pub const NAMES: [&'static str; 3] = ["TwoWheeler", "ThreeWheeler", "FourWheeler"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub color: String,
    pub plate_code: String,
    pub capacity: u32,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
}

/// Captain availability. New captains start inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptainStatus {
    Active,
    #[default]
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptainProfile {
    pub status: CaptainStatus,
    pub vehicle: Vehicle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Role-specific part of a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationProfile {
    User,
    Captain { vehicle: Vehicle },
}

impl RegistrationProfile {
    pub fn role(&self) -> Role {
        match self {
            RegistrationProfile::User => Role::User,
            RegistrationProfile::Captain { .. } => Role::Captain,
        }
    }
}

/// A validated registration payload. Still holds the plaintext password.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: Email,
    pub password: String,
    pub full_name: FullName,
    pub profile: RegistrationProfile,
}

impl Registration {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    /// Replace the plaintext password with its hash, producing a storable record.
    pub fn into_new_actor(self, password_hash: PasswordHash) -> NewActor {
        NewActor {
            email: self.email,
            full_name: self.full_name,
            profile: self.profile,
            password_hash,
        }
    }
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("profile", &self.profile)
            .finish()
    }
}

/// Record handed to the credential store. Carries the hash, never the plaintext.
#[derive(Debug, Clone)]
pub struct NewActor {
    pub email: Email,
    pub full_name: FullName,
    pub profile: RegistrationProfile,
    pub password_hash: PasswordHash,
}

impl NewActor {
    pub fn role(&self) -> Role {
        self.profile.role()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output-safe projection
// ─────────────────────────────────────────────────────────────────────────────

/// Read projection of a stored actor, safe to return to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorView {
    id: ActorId,
    role: Role,
    email: Email,
    full_name: FullName,
    #[serde(flatten)]
    captain: Option<CaptainProfile>,
    created_at: DateTime<Utc>,
}

impl ActorView {
    /// Build the projection for a freshly persisted actor.
    pub fn from_new(id: ActorId, actor: &NewActor, created_at: DateTime<Utc>) -> Self {
        let captain = match &actor.profile {
            RegistrationProfile::User => None,
            RegistrationProfile::Captain { vehicle } => Some(CaptainProfile {
                status: CaptainStatus::default(),
                vehicle: vehicle.clone(),
                location: None,
            }),
        };
        Self {
            id,
            role: actor.role(),
            email: actor.email.clone(),
            full_name: actor.full_name.clone(),
            captain,
            created_at,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    pub fn captain(&self) -> Option<&CaptainProfile> {
        self.captain.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> Vehicle {
        Vehicle {
            color: "Black".to_string(),
            plate_code: "KA-01-1234".to_string(),
            capacity: 4,
            vehicle_type: VehicleType::FourWheeler,
        }
    }

    fn new_actor(profile: RegistrationProfile) -> NewActor {
        NewActor {
            email: Email::parse("ann@example.com").unwrap(),
            full_name: FullName {
                first_name: "Ann".to_string(),
                last_name: None,
            },
            profile,
            password_hash: PasswordHash::from_stored("$2b$10$abcdefghijklmnopqrstuv"),
        }
    }

    #[test]
    fn email_is_normalized() {
        let email = Email::parse("  Ann@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "ann@example.com");
    }

    #[test]
    fn email_shape_rules() {
        assert!(is_email_shaped("a@x.com"));
        assert!(is_email_shaped("first.last@sub.domain.io"));
        assert!(!is_email_shaped("a@x"));
        assert!(!is_email_shaped("a@.com"));
        assert!(!is_email_shaped("a@x."));
        assert!(!is_email_shaped("@x.com"));
        assert!(!is_email_shaped("a b@x.com"));
        assert!(!is_email_shaped("a@@x.com"));
        assert!(!is_email_shaped("plain"));
    }

    #[test]
    fn user_view_has_no_password_or_captain_fields() {
        let view = ActorView::from_new(ActorId::new(), &new_actor(RegistrationProfile::User), Utc::now());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["role"], "user");
        assert_eq!(json["email"], "ann@example.com");
        assert_eq!(json["fullName"]["firstName"], "Ann");
        assert!(json["fullName"].get("lastName").is_none());
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("vehicle").is_none());
    }

    #[test]
    fn captain_view_defaults_to_inactive_without_location() {
        let actor = new_actor(RegistrationProfile::Captain { vehicle: vehicle() });
        let view = ActorView::from_new(ActorId::new(), &actor, Utc::now());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(view.role(), Role::Captain);
        assert_eq!(json["status"], "inactive");
        assert_eq!(json["vehicle"]["plateCode"], "KA-01-1234");
        assert_eq!(json["vehicle"]["type"], "FourWheeler");
        assert!(json.get("location").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn registration_debug_redacts_password() {
        let registration = Registration {
            email: Email::parse("ann@example.com").unwrap(),
            password: "Str0ng!Pass".to_string(),
            full_name: FullName {
                first_name: "Ann".to_string(),
                last_name: None,
            },
            profile: RegistrationProfile::User,
        };
        let rendered = format!("{registration:?}");
        assert!(!rendered.contains("Str0ng!Pass"));
    }
}

//! Role-aware validation rule sets.
//!
//! A [`RuleSet`] is an ordered list of field checks applied to a raw JSON
//! payload. Every rule runs; violations are collected rather than stopping at
//! the first one, so the caller can report all offending fields at once.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actor::{Email, FullName, Registration, RegistrationProfile, Vehicle, VehicleType, is_email_shaped};
use crate::{AuthAction, AuthError, PASSWORD_MAX_BYTES, Role};

const PASSWORD_MIN_LEN: usize = 8;
const NAME_MIN_LEN: usize = 3;

/// One violated field in a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: Cow<'static, str>,
    pub message: Cow<'static, str>,
}

impl FieldViolation {
    pub fn new(field: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    Email,
    Password { strong: bool },
    MaxBytes(usize),
    MinLen(usize),
    OptionalMinLen(usize),
    PlateCode,
    IntAtLeast(i64),
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldRule {
    field: &'static str,
    check: Check,
    message: Cow<'static, str>,
}

impl FieldRule {
    fn new(field: &'static str, check: Check, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            field,
            check,
            message: message.into(),
        }
    }

    fn passes(&self, payload: &Value) -> bool {
        let value = lookup(payload, self.field);
        match self.check {
            Check::Email => as_str(value).is_some_and(|s| is_email_shaped(s.trim())),
            Check::Password { strong } => as_str(value).is_some_and(|s| {
                if strong {
                    is_strong_password(s)
                } else {
                    s.chars().count() >= PASSWORD_MIN_LEN
                }
            }),
            // Absent or non-string values are reported by the field's other rule.
            Check::MaxBytes(max) => as_str(value).is_none_or(|s| s.len() <= max),
            Check::MinLen(min) => as_str(value).is_some_and(|s| s.trim().chars().count() >= min),
            Check::OptionalMinLen(min) => match value {
                None | Some(Value::Null) => true,
                Some(v) => as_str(Some(v)).is_some_and(|s| s.trim().chars().count() >= min),
            },
            Check::PlateCode => as_str(value).is_some_and(|s| {
                !s.is_empty() && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
            }),
            Check::IntAtLeast(min) => value
                .and_then(Value::as_i64)
                .is_some_and(|n| n >= min && u32::try_from(n).is_ok()),
            Check::OneOf(allowed) => as_str(value).is_some_and(|s| allowed.contains(&s)),
        }
    }
}

/// Ordered field checks for one (role, action) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<FieldRule>,
}

impl RuleSet {
    /// Run every rule and collect all violations.
    pub fn validate(&self, payload: &Value) -> Result<(), Vec<FieldViolation>> {
        let violations: Vec<FieldViolation> = self
            .rules
            .iter()
            .filter(|rule| !rule.passes(payload))
            .map(|rule| FieldViolation::new(rule.field, rule.message.clone()))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Field paths checked by this set, in order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.field)
    }
}

/// Select the rule set for a role and action.
///
/// Registration requires a strong password and names; captains additionally
/// require vehicle details. Login only checks email shape and password length.
pub fn rules_for(role: Role, action: AuthAction) -> RuleSet {
    let mut rules = vec![FieldRule::new("email", Check::Email, "Invalid email address")];
    let password_cap = FieldRule::new(
        "password",
        Check::MaxBytes(PASSWORD_MAX_BYTES),
        format!("Password must be at most {PASSWORD_MAX_BYTES} bytes long"),
    );

    match action {
        AuthAction::Login => {
            rules.push(FieldRule::new(
                "password",
                Check::Password { strong: false },
                format!("Password must be at least {PASSWORD_MIN_LEN} characters long"),
            ));
            rules.push(password_cap);
        }
        AuthAction::Register => {
            rules.push(FieldRule::new(
                "password",
                Check::Password { strong: true },
                format!("Password must be at least {PASSWORD_MIN_LEN} characters long and strong"),
            ));
            rules.push(password_cap);
            rules.push(FieldRule::new(
                "fullName.firstName",
                Check::MinLen(NAME_MIN_LEN),
                format!("firstName must be at least {NAME_MIN_LEN} characters long"),
            ));
            rules.push(FieldRule::new(
                "fullName.lastName",
                Check::OptionalMinLen(NAME_MIN_LEN),
                format!("lastName must be at least {NAME_MIN_LEN} characters long if provided"),
            ));

            if role == Role::Captain {
                rules.push(FieldRule::new(
                    "vehicle.color",
                    Check::MinLen(NAME_MIN_LEN),
                    "Vehicle color must be a valid string and at least 3 characters long",
                ));
                rules.push(FieldRule::new(
                    "vehicle.plateCode",
                    Check::PlateCode,
                    "Invalid vehicle plate number format",
                ));
                rules.push(FieldRule::new(
                    "vehicle.capacity",
                    Check::IntAtLeast(1),
                    "Vehicle capacity must be a positive integer",
                ));
                rules.push(FieldRule::new(
                    "vehicle.type",
                    Check::OneOf(&VehicleType::NAMES),
                    "Vehicle type must be one of 'TwoWheeler', 'ThreeWheeler', or 'FourWheeler'",
                ));
            }
        }
    }

    RuleSet { rules }
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed payloads
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    email: String,
    password: String,
    full_name: FullName,
    vehicle: Option<Value>,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

/// Validated login input.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginAttempt {
    pub email: Email,
    pub password: String,
}

impl core::fmt::Debug for LoginAttempt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginAttempt")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validate a registration payload for `role` and convert it to a typed value.
pub fn parse_registration(role: Role, payload: &Value) -> Result<Registration, AuthError> {
    rules_for(role, AuthAction::Register)
        .validate(payload)
        .map_err(AuthError::ValidationFailed)?;

    let body: RegisterBody = serde_json::from_value(payload.clone()).map_err(body_violation)?;
    let email = Email::parse(&body.email).map_err(|_| single_violation("email", "Invalid email address"))?;

    let full_name = FullName {
        first_name: body.full_name.first_name.trim().to_string(),
        last_name: body.full_name.last_name.map(|n| n.trim().to_string()),
    };

    let profile = match role {
        Role::User => RegistrationProfile::User,
        Role::Captain => {
            let vehicle = body
                .vehicle
                .ok_or_else(|| single_violation("vehicle", "Vehicle details are required"))?;
            let vehicle: Vehicle = serde_json::from_value(vehicle).map_err(body_violation)?;
            RegistrationProfile::Captain { vehicle }
        }
    };

    Ok(Registration {
        email,
        password: body.password,
        full_name,
        profile,
    })
}

/// Validate a login payload. The rule set is the same shape for both roles.
pub fn parse_login(role: Role, payload: &Value) -> Result<LoginAttempt, AuthError> {
    rules_for(role, AuthAction::Login)
        .validate(payload)
        .map_err(AuthError::ValidationFailed)?;

    let body: LoginBody = serde_json::from_value(payload.clone()).map_err(body_violation)?;
    let email = Email::parse(&body.email).map_err(|_| single_violation("email", "Invalid email address"))?;

    Ok(LoginAttempt {
        email,
        password: body.password,
    })
}

fn single_violation(field: &'static str, message: &'static str) -> AuthError {
    AuthError::ValidationFailed(vec![FieldViolation::new(field, message)])
}

fn body_violation(err: serde_json::Error) -> AuthError {
    AuthError::ValidationFailed(vec![FieldViolation::new("body", err.to_string())])
}

fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(payload, |node, key| node.get(key))
}

fn as_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

fn is_strong_password(s: &str) -> bool {
    s.chars().count() >= PASSWORD_MIN_LEN
        && s.chars().any(|c| c.is_lowercase())
        && s.chars().any(|c| c.is_uppercase())
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars().any(|c| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn violated_fields(result: Result<(), Vec<FieldViolation>>) -> Vec<String> {
        result
            .unwrap_err()
            .into_iter()
            .map(|v| v.field.into_owned())
            .collect()
    }

    fn captain_payload() -> Value {
        json!({
            "email": "cap@x.com",
            "password": "Str0ng!Pass",
            "fullName": { "firstName": "Cap" },
            "vehicle": {
                "color": "Red",
                "plateCode": "MH-12-AB-1234",
                "capacity": 4,
                "type": "FourWheeler"
            }
        })
    }

    #[test]
    fn user_registration_accepts_minimal_payload() {
        let payload = json!({
            "email": "a@x.com",
            "password": "Str0ng!Pass",
            "fullName": { "firstName": "Ann" }
        });

        let registration = parse_registration(Role::User, &payload).unwrap();
        assert_eq!(registration.email.as_str(), "a@x.com");
        assert_eq!(registration.full_name.first_name, "Ann");
        assert_eq!(registration.full_name.last_name, None);
        assert_eq!(registration.role(), Role::User);
    }

    #[test]
    fn captain_registration_parses_vehicle() {
        let registration = parse_registration(Role::Captain, &captain_payload()).unwrap();
        let RegistrationProfile::Captain { vehicle } = registration.profile else {
            panic!("expected captain profile");
        };
        assert_eq!(vehicle.capacity, 4);
        assert_eq!(vehicle.vehicle_type, VehicleType::FourWheeler);
    }

    #[test]
    fn violations_are_aggregated_not_fail_fast() {
        let payload = json!({
            "email": "nope",
            "password": "short",
            "fullName": { "firstName": "Al", "lastName": "B" }
        });

        let fields = violated_fields(rules_for(Role::User, AuthAction::Register).validate(&payload));
        assert_eq!(
            fields,
            vec!["email", "password", "fullName.firstName", "fullName.lastName"]
        );
    }

    #[test]
    fn captain_missing_vehicle_type_names_the_field() {
        let mut payload = captain_payload();
        payload["vehicle"].as_object_mut().unwrap().remove("type");

        let err = parse_registration(Role::Captain, &payload).unwrap_err();
        let AuthError::ValidationFailed(violations) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "vehicle.type");
    }

    #[test]
    fn captain_vehicle_rules_are_not_applied_to_users() {
        let rules = rules_for(Role::User, AuthAction::Register);
        assert!(rules.fields().all(|f| !f.starts_with("vehicle.")));

        let rules = rules_for(Role::Captain, AuthAction::Register);
        assert_eq!(rules.fields().filter(|f| f.starts_with("vehicle.")).count(), 4);
    }

    #[test]
    fn captain_vehicle_rules_reject_bad_values() {
        let mut payload = captain_payload();
        payload["vehicle"] = json!({
            "color": "Re",
            "plateCode": "mh-12",
            "capacity": 0,
            "type": "Bicycle"
        });

        let fields = violated_fields(rules_for(Role::Captain, AuthAction::Register).validate(&payload));
        assert_eq!(
            fields,
            vec!["vehicle.color", "vehicle.plateCode", "vehicle.capacity", "vehicle.type"]
        );
    }

    #[test]
    fn login_only_requires_minimum_length() {
        let payload = json!({ "email": "a@x.com", "password": "alllowercase" });
        let attempt = parse_login(Role::User, &payload).unwrap();
        assert_eq!(attempt.password, "alllowercase");

        let weak = json!({ "email": "a@x.com", "password": "alllowercase", "fullName": {} });
        assert!(parse_registration(Role::User, &weak).is_err());
    }

    #[test]
    fn passwords_past_bcrypt_input_limit_are_rejected() {
        let long = format!("Str0ng!{}", "a".repeat(80));

        let login = json!({ "email": "a@x.com", "password": long });
        let fields = violated_fields(rules_for(Role::User, AuthAction::Login).validate(&login));
        assert_eq!(fields, vec!["password"]);

        let register = json!({ "email": "a@x.com", "password": long, "fullName": { "firstName": "Ann" } });
        let err = parse_registration(Role::Captain, &register).unwrap_err();
        assert!(err.violations().unwrap().iter().any(|v| v.field == "password"));

        // Multi-byte characters count by bytes, not chars.
        let wide = json!({ "email": "a@x.com", "password": "é".repeat(40) });
        assert!(parse_login(Role::User, &wide).is_err());
        let fits = json!({ "email": "a@x.com", "password": "é".repeat(36) });
        assert!(parse_login(Role::User, &fits).is_ok());
    }

    #[test]
    fn login_rules_are_identical_across_roles() {
        assert_eq!(
            rules_for(Role::User, AuthAction::Login),
            rules_for(Role::Captain, AuthAction::Login)
        );
    }

    #[test]
    fn login_email_is_normalized() {
        let payload = json!({ "email": " A@X.com ", "password": "whatever123" });
        assert_eq!(parse_login(Role::Captain, &payload).unwrap().email.as_str(), "a@x.com");
    }

    #[test]
    fn non_object_body_reports_every_field() {
        let fields = violated_fields(rules_for(Role::User, AuthAction::Login).validate(&json!([1, 2])));
        assert_eq!(fields, vec!["email", "password"]);
    }

    #[test]
    fn strong_password_requires_every_character_class() {
        assert!(is_strong_password("Str0ng!Pass"));
        assert!(!is_strong_password("str0ng!pass"));
        assert!(!is_strong_password("STR0NG!PASS"));
        assert!(!is_strong_password("Strong!Pass"));
        assert!(!is_strong_password("Str0ngPass"));
        assert!(!is_strong_password("S0!a"));
    }

    proptest! {
        /// Property: a first name shorter than three characters is always reported.
        #[test]
        fn short_first_names_always_flagged(name in "[A-Za-z]{0,2}") {
            let payload = json!({
                "email": "a@x.com",
                "password": "Str0ng!Pass",
                "fullName": { "firstName": name }
            });
            let fields = violated_fields(rules_for(Role::User, AuthAction::Register).validate(&payload));
            prop_assert_eq!(fields, vec!["fullName.firstName".to_string()]);
        }

        /// Property: plate codes made of uppercase letters, digits and hyphens pass.
        #[test]
        fn well_formed_plates_pass(plate in "[A-Z0-9-]{1,16}") {
            let mut payload = captain_payload();
            payload["vehicle"]["plateCode"] = json!(plate);
            prop_assert!(rules_for(Role::Captain, AuthAction::Register).validate(&payload).is_ok());
        }
    }
}

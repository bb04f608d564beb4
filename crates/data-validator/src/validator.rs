//! Student payload validator

use regex::Regex;
use serde::{Deserialize, Serialize};
use storage::NewStudent;
use tracing::debug;

use crate::error::ValidationError;

/// `local@domain`, with a dotted domain made of letters, digits and inner hyphens
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

/// Request body for create and update, as decoded from JSON
///
/// Every field is optional here so that a missing field is reported by
/// [`Validator::validate`] instead of failing the decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Smallest accepted age
    pub min_age: i64,
    /// Longest accepted name, in characters
    pub max_name_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_age: 1,
            max_name_len: 255,
        }
    }
}

/// Reusable validator for student payloads
///
/// Build one at startup and share it; validation never mutates it.
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
    email: Regex,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            config,
            email: Regex::new(EMAIL_PATTERN)?,
        })
    }

    /// Validate every field, collecting all violations
    pub fn validate(&self, payload: &StudentPayload) -> Result<NewStudent, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let name = self
            .validate_name(payload.name.as_deref())
            .map_err(|e| errors.push(e))
            .ok();
        let email = self
            .validate_email(payload.email.as_deref())
            .map_err(|e| errors.push(e))
            .ok();
        let age = self
            .validate_age(payload.age)
            .map_err(|e| errors.push(e))
            .ok();

        match (name, email, age) {
            (Some(name), Some(email), Some(age)) => Ok(NewStudent { name, email, age }),
            _ => {
                debug!("Rejected student payload with {} violation(s)", errors.len());
                Err(errors)
            }
        }
    }

    /// Validate the name, returning it trimmed
    pub fn validate_name(&self, name: Option<&str>) -> Result<String, ValidationError> {
        let name = required("name", name)?;
        if name.chars().count() > self.config.max_name_len {
            return Err(ValidationError::TooLong {
                field: "name",
                max: self.config.max_name_len,
            });
        }
        Ok(name.to_string())
    }

    /// Validate the email, returning it trimmed
    pub fn validate_email(&self, email: Option<&str>) -> Result<String, ValidationError> {
        let email = required("email", email)?;
        if !self.email.is_match(email) {
            return Err(ValidationError::InvalidEmail("email"));
        }
        Ok(email.to_string())
    }

    /// Validate the age
    pub fn validate_age(&self, age: Option<i64>) -> Result<i64, ValidationError> {
        let age = age.ok_or(ValidationError::Required("age"))?;
        if age < self.config.min_age {
            return Err(ValidationError::TooSmall {
                field: "age",
                min: self.config.min_age,
            });
        }
        Ok(age)
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::Required(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn validator() -> Validator {
        Validator::new(ValidationConfig::default()).unwrap()
    }

    fn payload(name: &str, email: &str, age: i64) -> StudentPayload {
        StudentPayload {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            age: Some(age),
        }
    }

    #[test]
    fn test_valid_payload() {
        let student = validator().validate(&payload(" Ann ", "ann@x.com", 20)).unwrap();
        assert_eq!(
            student,
            NewStudent {
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
                age: 20,
            }
        );
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let errors = validator().validate(&StudentPayload::default()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(ValidationError::field).collect();
        assert_eq!(fields, vec!["name", "email", "age"]);
        assert_eq!(errors[0].to_string(), "field name is required");
    }

    #[test]
    fn test_blank_name() {
        let errors = validator().validate(&payload("   ", "ann@x.com", 20)).unwrap_err();
        assert_eq!(errors, vec![ValidationError::Required("name")]);
    }

    #[test]
    fn test_long_name() {
        let v = Validator::new(ValidationConfig {
            max_name_len: 3,
            ..Default::default()
        })
        .unwrap();
        assert!(v.validate_name(Some("Ann")).is_ok());
        assert_eq!(
            v.validate_name(Some("Anna")),
            Err(ValidationError::TooLong { field: "name", max: 3 })
        );
    }

    #[test]
    fn test_email_format() {
        let v = validator();
        assert!(v.validate_email(Some("ann@x.com")).is_ok());
        assert!(v.validate_email(Some("first.last+tag@sub.example.org")).is_ok());
        assert!(v.validate_email(Some("ann")).is_err());
        assert_eq!(
            v.validate_email(Some("ann@localhost")),
            Err(ValidationError::InvalidEmail("email"))
        );
        assert!(v.validate_email(Some("ann@")).is_err());
        assert!(v.validate_email(Some("@x.com")).is_err());
        assert!(v.validate_email(Some("ann@x..com")).is_err());
        assert!(v.validate_email(Some("ann @x.com")).is_err());
    }

    #[test]
    fn test_age_must_be_positive() {
        let v = validator();
        assert_eq!(v.validate_age(Some(1)), Ok(1));
        assert_eq!(
            v.validate_age(Some(0)),
            Err(ValidationError::TooSmall { field: "age", min: 1 })
        );
        assert_eq!(v.validate_age(None), Err(ValidationError::Required("age")));
    }

    #[test]
    fn test_payload_ignores_unknown_fields() {
        let payload: StudentPayload =
            serde_json::from_str(r#"{"name":"Ann","email":"ann@x.com","age":20,"id":9}"#).unwrap();
        assert!(validator().validate(&payload).is_ok());
    }

    proptest! {
        #[test]
        fn prop_positive_ages_accepted(age in 1i64..i64::MAX) {
            prop_assert_eq!(validator().validate_age(Some(age)), Ok(age));
        }

        #[test]
        fn prop_non_positive_ages_rejected(age in i64::MIN..=0i64) {
            prop_assert!(validator().validate_age(Some(age)).is_err());
        }

        #[test]
        fn prop_emails_without_at_rejected(email in "[a-z0-9.]{1,30}") {
            prop_assert_eq!(
                validator().validate_email(Some(&email)),
                Err(ValidationError::InvalidEmail("email"))
            );
        }

        #[test]
        fn prop_simple_emails_accepted(local in "[a-z0-9]{1,20}", domain in "[a-z]{1,20}", tld in "[a-z]{2,6}") {
            let email = format!("{}@{}.{}", local, domain, tld);
            prop_assert!(validator().validate_email(Some(&email)).is_ok());
        }
    }
}

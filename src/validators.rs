/// Input validators for login and registration bodies.
///
/// Every failing field collects one or more `{rule, message}` issues keyed by
/// its JSON name, so clients get all problems in a single response.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{FieldIssue, ValidationError};

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// POST /login body. Absent fields deserialize as empty and fail `required`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /users body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Default)]
struct Issues(BTreeMap<&'static str, Vec<FieldIssue>>);

impl Issues {
    fn push(&mut self, field: &'static str, rule: &'static str, message: String) {
        self.0.entry(field).or_default().push(FieldIssue { rule, message });
    }

    fn required(&mut self, field: &'static str, value: &str) -> bool {
        if value.is_empty() {
            self.push(field, "required", format!("{} is required.", field));
            return false;
        }
        true
    }

    fn email(&mut self, field: &'static str, value: &str) {
        if self.required(field, value) && !is_valid_email(value) {
            self.push(field, "email", "Invalid email address format.".to_string());
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Fields(self.0))
        }
    }
}

/// Format and length check on an email address.
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::default();
        issues.email("email", &self.email);
        issues.required("password", &self.password);
        issues.finish()
    }
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::default();
        issues.email("email", &self.email);
        issues.required("password", &self.password);
        issues.required("first_name", &self.first_name);
        issues.required("last_name", &self.last_name);
        issues.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(err: ValidationError) -> BTreeMap<&'static str, Vec<FieldIssue>> {
        match err {
            ValidationError::Fields(fields) => fields,
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("test.email@domain.co.uk"));
        assert!(is_valid_email("user+tag@example.com"));
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@@example.com"));
    }

    #[test]
    fn test_email_length_limit() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(!is_valid_email(&too_long));
    }

    #[test]
    fn test_login_request_ok() {
        let req = LoginRequest {
            email: "a@x.com".into(),
            password: "p".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_login_request_reports_every_field() {
        let req = LoginRequest {
            email: "".into(),
            password: "".into(),
        };
        let fields = fields(req.validate().unwrap_err());

        assert_eq!(fields["email"][0].rule, "required");
        assert_eq!(fields["email"][0].message, "email is required.");
        assert_eq!(fields["password"][0].rule, "required");
    }

    #[test]
    fn test_bad_email_reports_email_rule_only() {
        let req = LoginRequest {
            email: "not-an-email".into(),
            password: "p".into(),
        };
        let fields = fields(req.validate().unwrap_err());

        assert_eq!(fields.len(), 1);
        assert_eq!(fields["email"].len(), 1);
        assert_eq!(fields["email"][0].rule, "email");
    }

    #[test]
    fn test_register_request_missing_names() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"secret123"}"#).unwrap();
        let fields = fields(req.validate().unwrap_err());

        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("last_name"));
        assert!(!fields.contains_key("email"));
    }
}

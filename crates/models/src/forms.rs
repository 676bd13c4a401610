use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

lazy_static! {
    static ref EMAIL: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    )
    .unwrap();
}

/// Field-level validation messages, in submission order per field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_owned()).or_default().push(message.into());
    }

    /// First message recorded for `field`
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A submitted form together with the validation errors found so far.
///
/// Serialized back into the page so the user sees what they typed next to each error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Form {
    values: HashMap<String, String>,
    pub errors: FormErrors,
}

impl Form {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            errors: FormErrors::default(),
        }
    }

    /// Raw value of `field`, or an empty string
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or_default()
    }

    /// Trimmed value of `field`
    pub fn trimmed(&self, field: &str) -> &str {
        self.get(field).trim()
    }

    /// Drops the submitted value of `field` so it is not echoed back
    pub fn forget(&mut self, field: &str) {
        self.values.remove(field);
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn required(&mut self, fields: &[&str]) {
        for field in fields {
            if self.trimmed(field).is_empty() {
                self.errors.add(field, "This field cannot be empty");
            }
        }
    }

    pub fn min_length(&mut self, field: &str, length: usize) -> bool {
        if self.trimmed(field).chars().count() < length {
            self.errors.add(
                field,
                format!("This field must be at least {length} characters long"),
            );
            return false;
        }

        true
    }

    pub fn is_email(&mut self, field: &str) {
        if !EMAIL.is_match(self.trimmed(field)) {
            self.errors.add(field, "Invalid email address");
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> Form {
        Form::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_required_trims_whitespace() {
        let mut f = form(&[("first_name", "   "), ("last_name", "Smith")]);
        f.required(&["first_name", "last_name", "email"]);

        assert!(!f.is_valid());
        assert_eq!(f.errors.get("first_name"), Some("This field cannot be empty"));
        assert_eq!(f.errors.get("email"), Some("This field cannot be empty"));
        assert_eq!(f.errors.get("last_name"), None);
    }

    #[test]
    fn test_min_length() {
        let mut f = form(&[("first_name", "J")]);
        assert!(!f.min_length("first_name", 2));
        assert_eq!(
            f.errors.get("first_name"),
            Some("This field must be at least 2 characters long")
        );

        let mut f = form(&[("first_name", "Jo")]);
        assert!(f.min_length("first_name", 2));
        assert!(f.is_valid());
    }

    #[test]
    fn test_is_email() {
        for valid in ["me@here.com", "first.last+tag@mail.example.org"] {
            let mut f = form(&[("email", valid)]);
            f.is_email("email");
            assert!(f.is_valid(), "{valid} should be accepted");
        }

        for invalid in ["", "me", "me@", "me@here", "@here.com", "me here@x.com"] {
            let mut f = form(&[("email", invalid)]);
            f.is_email("email");
            assert_eq!(f.errors.get("email"), Some("Invalid email address"), "{invalid}");
        }
    }

    #[test]
    fn test_forget_keeps_errors() {
        let mut f = form(&[("email", "me"), ("password", "secret")]);
        f.is_email("email");
        f.forget("password");

        assert_eq!(f.get("password"), "");
        assert_eq!(f.get("email"), "me");
        assert!(!f.is_valid());
    }

    #[test]
    fn test_has() {
        let f = form(&[("remove_block_1_2050-01-01", "1"), ("empty", "")]);
        assert!(f.has("remove_block_1_2050-01-01"));
        assert!(!f.has("empty"));
        assert!(!f.has("missing"));
    }
}

use std::collections::BTreeMap;

use serde::Serialize;

/// Accumulates per-field validation messages. Field names mirror the request
/// payload, nested list entries use dotted paths such as `items.2.quantity`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(BTreeMap<String, Vec<String>>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Finishes an accumulation pass: `Err(self)` if anything was recorded.
    pub fn check(self) -> Result<(), Violations> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Required, non-empty after trimming, at most `max_len` characters.
    /// Returns the trimmed value when it passed.
    pub fn require_str(&mut self, field: &str, value: Option<&str>, max_len: usize) -> Option<String> {
        match value.map(str::trim) {
            None | Some("") => {
                self.add(field, "is required");
                None
            }
            Some(v) if v.chars().count() > max_len => {
                self.add(field, format!("must not exceed {max_len} characters"));
                None
            }
            Some(v) => Some(v.to_string()),
        }
    }

    /// Like `require_str` but additionally checks the value looks like an
    /// email address.
    pub fn require_email(&mut self, field: &str, value: Option<&str>, max_len: usize) -> Option<String> {
        let v = self.require_str(field, value, max_len)?;
        if !looks_like_email(&v) {
            self.add(field, "must be a valid email address");
            return None;
        }
        Some(v)
    }

    /// Optional field: absent or blank is fine, anything else is
    /// length-bounded. Returns the trimmed value when one was given.
    pub fn optional_str(&mut self, field: &str, value: Option<&str>, max_len: usize) -> Option<String> {
        match value.map(str::trim) {
            None | Some("") => None,
            Some(v) if v.chars().count() > max_len => {
                self.add(field, format!("must not exceed {max_len} characters"));
                None
            }
            Some(v) => Some(v.to_string()),
        }
    }
}

/// Cheap structural check: one `@`, non-empty local part, dotted domain.
/// Real deliverability is not this layer's problem.
pub fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !value.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_str_rejects_missing_and_blank() {
        let mut v = Violations::new();
        assert_eq!(v.require_str("name", None, 255), None);
        assert_eq!(v.require_str("email", Some("   "), 255), None);
        assert!(v.check().is_err());
    }

    #[test]
    fn require_str_trims_and_accepts() {
        let mut v = Violations::new();
        assert_eq!(v.require_str("name", Some("  Alice  "), 255), Some("Alice".to_string()));
        assert!(v.check().is_ok());
    }

    #[test]
    fn require_str_enforces_max_len() {
        let mut v = Violations::new();
        let long = "x".repeat(256);
        assert_eq!(v.require_str("name", Some(&long), 255), None);
        assert!(v.check().is_err());
    }

    #[test]
    fn require_email_rejects_malformed_addresses() {
        for bad in ["plainaddress", "@nolocal.com", "user@", "user@nodot", "user @host.com"] {
            let mut v = Violations::new();
            assert_eq!(v.require_email("email", Some(bad), 255), None, "accepted {bad:?}");
            assert!(v.check().is_err());
        }
    }

    #[test]
    fn require_email_accepts_ordinary_addresses() {
        let mut v = Violations::new();
        assert_eq!(
            v.require_email("email", Some("user@example.com"), 255),
            Some("user@example.com".to_string())
        );
        assert!(v.check().is_ok());
    }

    #[test]
    fn optional_str_treats_blank_as_absent() {
        let mut v = Violations::new();
        assert_eq!(v.optional_str("notes", Some(""), 100), None);
        assert_eq!(v.optional_str("notes", None, 100), None);
        assert_eq!(v.optional_str("notes", Some(" hi "), 100), Some("hi".to_string()));
        assert!(v.check().is_ok());
    }

    #[test]
    fn messages_accumulate_per_field() {
        let mut v = Violations::new();
        v.add("name", "is required");
        v.add("name", "must not exceed 255 characters");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["name"].as_array().unwrap().len(), 2);
    }
}

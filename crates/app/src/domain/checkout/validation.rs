//! Billing validation.

use serde::{Serialize, Serializer, ser::SerializeMap};
use smallvec::SmallVec;

use crate::domain::orders::data::BillingDetails;

/// Per-field validation messages, kept in the order the fields were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(SmallVec<[(&'static str, String); 4]>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message per field wins.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.0.push((field, message.into()));
        }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0
            .iter()
            .map(|(name, message)| (*name, message.as_str()))
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;

        for (field, message) in &self.0 {
            map.serialize_entry(field, message)?;
        }

        map.end()
    }
}

impl BillingDetails {
    /// Check every billing field, collecting one message per failing field.
    ///
    /// The payment method is already constrained by its type.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let required = [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                errors.insert(field, "This field is required.");
            }
        }

        if !self.email.trim().is_empty() && !is_valid_email(self.email.trim()) {
            errors.insert("email", "Enter a valid email address.");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels = domain.split('.').collect::<Vec<_>>();

    let Some((tld, hosts)) = labels.split_last() else {
        return false;
    };

    !hosts.is_empty() && hosts.iter().all(|label| is_valid_label(label)) && is_valid_tld(tld)
}

/// A DNS label: 1 to 63 alphanumerics or hyphens, not starting or ending with a hyphen.
fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.chars().count() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_alphanumeric() || c == '-')
}

fn is_valid_tld(tld: &str) -> bool {
    if let Some(punycode) = tld.strip_prefix("xn--") {
        return !punycode.is_empty() && punycode.chars().all(|c| c.is_ascii_alphanumeric());
    }

    tld.chars().count() >= 2
        && is_valid_label(tld)
        && tld.chars().all(|c| c.is_alphabetic() || c == '-')
}

//! Public form validation: complaints and post view tracking.
//!
//! Validation collects every field error in one pass so the page can render them inline next to
//! each field. Only a fully valid form produces a payload; nothing partial is ever sent.

use crate::constants::{
    COMPLAINT_MESSAGE_MAX_CHARS, COMPLAINT_MESSAGE_MIN_CHARS, COMPLAINT_NAME_MAX_CHARS,
};
use portal_types::{NonEmptyText, PhoneNumber, TextError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw complaint form fields as posted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    /// Hidden honeypot field; real visitors never fill it.
    #[serde(default)]
    pub hp_company: String,
}

/// Validated complaint, ready to POST to `/complaints`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplaintPayload {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintField {
    Name,
    Phone,
    Message,
}

impl ComplaintField {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintField::Name => "name",
            ComplaintField::Phone => "phone",
            ComplaintField::Message => "message",
        }
    }
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    fields: BTreeMap<ComplaintField, String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: ComplaintField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    fn insert(&mut self, field: ComplaintField, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {message}", field.as_str()))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Why a complaint submission was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplaintRejection {
    /// One or more fields are invalid.
    Invalid(FormErrors),
    /// The honeypot was filled; the submission is dropped silently.
    Suspicious,
}

impl ComplaintForm {
    /// Validate every field and build the payload sent to the API.
    ///
    /// # Errors
    ///
    /// Returns `ComplaintRejection::Suspicious` when the honeypot is filled, otherwise
    /// `ComplaintRejection::Invalid` carrying every field error found.
    pub fn validate(&self) -> Result<ComplaintPayload, ComplaintRejection> {
        if !self.hp_company.trim().is_empty() {
            return Err(ComplaintRejection::Suspicious);
        }

        let mut errors = FormErrors::default();

        let name = self.name.trim();
        let name = if name.is_empty() {
            None
        } else {
            match NonEmptyText::bounded(name, COMPLAINT_NAME_MAX_CHARS) {
                Ok(text) => Some(text.into_inner()),
                Err(_) => {
                    errors.insert(
                        ComplaintField::Name,
                        format!("الاسم يجب ألا يتجاوز {COMPLAINT_NAME_MAX_CHARS} حرفًا"),
                    );
                    None
                }
            }
        };

        let phone = self.phone.trim();
        let phone = if phone.is_empty() {
            None
        } else {
            match PhoneNumber::parse(phone) {
                Ok(number) => Some(number.as_str().to_string()),
                Err(_) => {
                    errors.insert(
                        ComplaintField::Phone,
                        "رقم الهاتف غير صالح (8 إلى 15 رقمًا مع + اختياري)",
                    );
                    None
                }
            }
        };

        let message = self.message.trim();
        let message = match NonEmptyText::bounded(message, COMPLAINT_MESSAGE_MAX_CHARS) {
            Ok(text) if text.char_len() >= COMPLAINT_MESSAGE_MIN_CHARS => Some(text.into_inner()),
            Ok(_) | Err(TextError::Empty) => {
                errors.insert(
                    ComplaintField::Message,
                    format!("الرسالة يجب أن تكون {COMPLAINT_MESSAGE_MIN_CHARS} أحرف على الأقل"),
                );
                None
            }
            Err(_) => {
                errors.insert(
                    ComplaintField::Message,
                    format!("الرسالة يجب ألا تتجاوز {COMPLAINT_MESSAGE_MAX_CHARS} حرف"),
                );
                None
            }
        };

        match message {
            Some(message) if errors.is_empty() => Ok(ComplaintPayload {
                name,
                phone,
                message,
            }),
            _ => Err(ComplaintRejection::Invalid(errors)),
        }
    }
}

/// Characters left in the message field, counted after trimming. Never negative.
pub fn remaining_chars(message: &str) -> usize {
    COMPLAINT_MESSAGE_MAX_CHARS.saturating_sub(message.trim().chars().count())
}

/// Body of `POST /track-view`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackView {
    pub slug: String,
    pub uid: String,
}

impl TrackView {
    pub fn new(slug: &str, visitor: &VisitorId) -> Self {
        Self {
            slug: slug.to_string(),
            uid: visitor.as_str().to_string(),
        }
    }
}

/// Persistent anonymous visitor id stored in the visitor cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisitorId(String);

impl VisitorId {
    /// Fresh random (v4) visitor id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Accept a cookie value only if it is a well-formed UUID.
    pub fn parse(value: &str) -> Option<Self> {
        uuid::Uuid::parse_str(value.trim())
            .ok()
            .map(|id| Self(id.hyphenated().to_string()))
    }

    /// Reuse the cookie value when valid, otherwise mint a new id. The flag is `true` when a
    /// new id was generated and the cookie must be set.
    pub fn from_cookie(value: Option<&str>) -> (Self, bool) {
        match value.and_then(Self::parse) {
            Some(id) => (id, false),
            None => (Self::generate(), true),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, phone: &str, message: &str) -> ComplaintForm {
        ComplaintForm {
            name: name.into(),
            phone: phone.into(),
            message: message.into(),
            hp_company: String::new(),
        }
    }

    #[test]
    fn valid_form_yields_trimmed_payload() {
        let payload = form("  Amal ", " +218912345678 ", "  The clinic was closed today.  ")
            .validate()
            .expect("valid form");
        assert_eq!(payload.name.as_deref(), Some("Amal"));
        assert_eq!(payload.phone.as_deref(), Some("+218912345678"));
        assert_eq!(payload.message, "The clinic was closed today.");
    }

    #[test]
    fn optional_fields_may_be_blank() {
        let payload = form("", "  ", "Long enough message").validate().unwrap();
        assert_eq!(payload.name, None);
        assert_eq!(payload.phone, None);
    }

    #[test]
    fn all_field_errors_are_reported_together() {
        let long_name = "x".repeat(COMPLAINT_NAME_MAX_CHARS + 1);
        let Err(ComplaintRejection::Invalid(errors)) =
            form(&long_name, "12-34", "short").validate()
        else {
            panic!("expected field errors");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors.get(ComplaintField::Name).is_some());
        assert!(errors.get(ComplaintField::Phone).is_some());
        assert!(errors.get(ComplaintField::Message).is_some());
    }

    #[test]
    fn message_length_bounds() {
        assert!(form("", "", &"a".repeat(10)).validate().is_ok());
        assert!(form("", "", &"a".repeat(500)).validate().is_ok());
        assert!(form("", "", &"a".repeat(9)).validate().is_err());
        assert!(form("", "", &"a".repeat(501)).validate().is_err());
        assert!(form("", "", "          ").validate().is_err());
    }

    #[test]
    fn phone_pattern() {
        assert!(form("", "12345678", "valid message").validate().is_ok());
        assert!(form("", "+123456789012345", "valid message").validate().is_ok());
        assert!(form("", "1234567", "valid message").validate().is_err());
        assert!(form("", "+2189123456789012", "valid message").validate().is_err());
        assert!(form("", "0912 345 678", "valid message").validate().is_err());
    }

    #[test]
    fn honeypot_rejects_silently() {
        let mut f = form("", "", "valid message");
        f.hp_company = "ACME".into();
        assert_eq!(f.validate(), Err(ComplaintRejection::Suspicious));
    }

    #[test]
    fn remaining_chars_counts_trimmed_chars() {
        assert_eq!(remaining_chars(""), COMPLAINT_MESSAGE_MAX_CHARS);
        assert_eq!(remaining_chars("  مرحبا  "), COMPLAINT_MESSAGE_MAX_CHARS - 5);
        assert_eq!(remaining_chars(&"a".repeat(600)), 0);
    }

    #[test]
    fn visitor_id_reuses_valid_cookie() {
        let (id, fresh) = VisitorId::from_cookie(Some("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!fresh);
        assert_eq!(id.as_str(), "67e55044-10b1-426f-9247-bb680e5fe0c8");

        let (id, fresh) = VisitorId::from_cookie(Some("nouid"));
        assert!(fresh);
        assert!(VisitorId::parse(id.as_str()).is_some());
        assert!(VisitorId::from_cookie(None).1);

        let track = TrackView::new("clinic-news", &id);
        assert_eq!(track.uid, id.as_str());
    }
}

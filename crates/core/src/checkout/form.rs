//! Shipping details form and validation.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Digits kept for a phone number.
pub const PHONE_DIGITS: usize = 10;

/// Digits kept for a postal pincode.
pub const PINCODE_DIGITS: usize = 6;

/// Form fields that carry validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Recipient name.
    FullName,
    /// Contact email.
    Email,
    /// Contact phone number.
    Phone,
    /// Street address.
    Address,
    /// City.
    City,
    /// State or province.
    State,
    /// Postal pincode.
    Pincode,
}

/// Validation messages keyed by field. Empty means the form is valid.
pub type FieldErrors = FxHashMap<Field, String>;

/// The shipping-details draft collected during checkout.
///
/// Pre-seeded from the signed-in profile and any persisted draft via
/// [`ShippingForm::seeded`]; every field except `landmark` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingForm {
    /// Recipient name.
    pub full_name: String,

    /// Contact email.
    pub email: String,

    /// Contact phone number, digits only.
    pub phone: String,

    /// Street address.
    pub address: String,

    /// City.
    pub city: String,

    /// State or province.
    pub state: String,

    /// Postal pincode, digits only.
    pub pincode: String,

    /// Optional delivery landmark.
    pub landmark: String,
}

impl ShippingForm {
    /// Build the initial draft: a reloaded draft wins over the profile,
    /// except where its name or email is empty and the profile can fill
    /// the hole.
    #[must_use]
    pub fn seeded(profile_full_name: &str, profile_email: &str, draft: Option<Self>) -> Self {
        let mut form = draft.unwrap_or_default();

        if form.full_name.trim().is_empty() {
            form.full_name = profile_full_name.to_owned();
        }

        if form.email.trim().is_empty() {
            form.email = profile_email.to_owned();
        }

        form
    }

    /// Store a phone number as typed, keeping only digits, capped at
    /// [`PHONE_DIGITS`].
    pub fn set_phone(&mut self, raw: &str) {
        self.phone = sanitize_digits(raw, PHONE_DIGITS);
    }

    /// Store a pincode as typed, keeping only digits, capped at
    /// [`PINCODE_DIGITS`].
    pub fn set_pincode(&mut self, raw: &str) {
        self.pincode = sanitize_digits(raw, PINCODE_DIGITS);
    }

    /// Validate the whole form, returning one message per failing field.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();

        if self.full_name.trim().is_empty() {
            errors.insert(Field::FullName, "Full name is required".to_owned());
        }

        if !is_valid_email(self.email.trim()) {
            errors.insert(Field::Email, "Enter a valid email address".to_owned());
        }

        if !is_exact_digits(&self.phone, PHONE_DIGITS) {
            errors.insert(Field::Phone, "Phone number must be 10 digits".to_owned());
        }

        if self.address.trim().is_empty() {
            errors.insert(Field::Address, "Address is required".to_owned());
        }

        if self.city.trim().is_empty() {
            errors.insert(Field::City, "City is required".to_owned());
        }

        if self.state.trim().is_empty() {
            errors.insert(Field::State, "State is required".to_owned());
        }

        if !is_exact_digits(&self.pincode, PINCODE_DIGITS) {
            errors.insert(Field::Pincode, "Pincode must be 6 digits".to_owned());
        }

        errors
    }

    /// Whether [`ShippingForm::validate`] reports no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Keep only ASCII digits from `raw`, capped at `max` characters.
#[must_use]
pub fn sanitize_digits(raw: &str, max: usize) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(max)
        .collect()
}

fn is_exact_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

/// A `local@domain` shape check: one `@`, non-empty halves, no whitespace,
/// and a dot somewhere inside the domain.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() {
        return false;
    }

    if email.chars().any(char::is_whitespace) || domain.contains('@') {
        return false;
    }

    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ShippingForm {
        ShippingForm {
            full_name: "Asha Rao".to_owned(),
            email: "asha@example.com".to_owned(),
            phone: "9876543210".to_owned(),
            address: "14 Lake View Road".to_owned(),
            city: "Pune".to_owned(),
            state: "Maharashtra".to_owned(),
            pincode: "411001".to_owned(),
            landmark: String::new(),
        }
    }

    #[test]
    fn valid_form_has_no_errors() {
        assert!(valid_form().validate().is_empty());
    }

    #[test]
    fn landmark_is_optional() {
        let mut form = valid_form();
        form.landmark = String::new();

        assert!(form.is_valid());
    }

    #[test]
    fn each_missing_required_field_reports_exactly_that_field() {
        let cases: [(Field, fn(&mut ShippingForm)); 7] = [
            (Field::FullName, |f| f.full_name = "   ".to_owned()),
            (Field::Email, |f| f.email = "not-an-email".to_owned()),
            (Field::Phone, |f| f.phone = "12345".to_owned()),
            (Field::Address, |f| f.address = String::new()),
            (Field::City, |f| f.city = String::new()),
            (Field::State, |f| f.state = String::new()),
            (Field::Pincode, |f| f.pincode = "411".to_owned()),
        ];

        for (field, break_field) in cases {
            let mut form = valid_form();
            break_field(&mut form);

            let errors = form.validate();

            assert_eq!(errors.len(), 1, "expected one error for {field:?}");
            assert!(errors.contains_key(&field), "expected error on {field:?}");
        }
    }

    #[test]
    fn email_shapes() {
        for valid in ["a@b.co", "user.name@mail.example.org"] {
            assert!(is_valid_email(valid), "{valid} should be valid");
        }

        for invalid in [
            "",
            "plain",
            "@b.co",
            "a@",
            "a@b",
            "a b@c.co",
            "a@b@c.co",
            "a@.co",
            "a@co.",
        ] {
            assert!(!is_valid_email(invalid), "{invalid} should be invalid");
        }
    }

    #[test]
    fn phone_input_is_sanitized_as_typed() {
        let mut form = ShippingForm::default();

        form.set_phone("98-765 43210abc");

        assert_eq!(form.phone, "9876543210");
    }

    #[test]
    fn phone_keeps_at_most_ten_digits() {
        let mut form = ShippingForm::default();

        form.set_phone("98765432109");

        assert_eq!(form.phone, "9876543210");
    }

    #[test]
    fn pincode_keeps_at_most_six_digits() {
        let mut form = ShippingForm::default();

        form.set_pincode("12a3456789");

        assert_eq!(form.pincode, "123456");
    }

    #[test]
    fn seeded_prefers_the_draft() {
        let mut draft = ShippingForm::default();
        draft.full_name = "Draft Name".to_owned();
        draft.email = "draft@example.com".to_owned();
        draft.city = "Pune".to_owned();

        let form = ShippingForm::seeded("Profile Name", "profile@example.com", Some(draft));

        assert_eq!(form.full_name, "Draft Name");
        assert_eq!(form.email, "draft@example.com");
        assert_eq!(form.city, "Pune");
    }

    #[test]
    fn seeded_fills_empty_draft_fields_from_profile() {
        let mut draft = ShippingForm::default();
        draft.city = "Pune".to_owned();

        let form = ShippingForm::seeded("Profile Name", "profile@example.com", Some(draft));

        assert_eq!(form.full_name, "Profile Name");
        assert_eq!(form.email, "profile@example.com");
        assert_eq!(form.city, "Pune");
    }

    #[test]
    fn seeded_without_draft_uses_profile() {
        let form = ShippingForm::seeded("Profile Name", "profile@example.com", None);

        assert_eq!(form.full_name, "Profile Name");
        assert_eq!(form.email, "profile@example.com");
        assert!(form.address.is_empty());
    }
}

//! Address and profile form validation.
//!
//! Every validator runs all of its checks and returns the messages for
//! every failing field, in field order. An empty list means the form is
//! valid. Messages are shown to shoppers verbatim.

use std::sync::LazyLock;

use bazaar_core::{CityId, CountryId};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Optional `+`, then 2-15 ASCII digits not starting with 0.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[1-9][0-9]{1,14}$").unwrap_or_else(|e| unreachable!("phone regex: {e}"))
});

/// A run of 4-10 ASCII digits at the end. Only the end is anchored, so
/// `"AB 12345"` passes; existing saved addresses rely on this.
static POSTCODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{4,10}$").unwrap_or_else(|e| unreachable!("postcode regex: {e}"))
});

/// Shortest number accepted on top of the pattern; shorter inputs are
/// extensions or typos, never a reachable number.
const MIN_PHONE_DIGITS: usize = 7;

const MIN_NAME_LENGTH: usize = 3;
const MIN_ADDRESS_LENGTH: usize = 3;

/// Whether a city and country must be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// New address: city and country are required.
    Create,
    /// Editing an existing address: city and country are kept as-is.
    Update,
}

/// Address form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressForm {
    pub full_name: String,
    pub phone_number: String,
    pub address_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    pub postcode: String,
    #[serde(default)]
    pub city_id: Option<CityId>,
    #[serde(default)]
    pub country_id: Option<CountryId>,
    #[serde(default)]
    pub is_default: bool,
}

/// Profile form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub full_name: String,
    pub phone_number: String,
}

fn check_full_name(value: &str, errors: &mut Vec<String>) {
    let value = value.trim();
    if value.is_empty() {
        errors.push("Full name is required".to_string());
    } else if value.chars().count() < MIN_NAME_LENGTH {
        errors.push(format!(
            "Full name must be at least {MIN_NAME_LENGTH} characters"
        ));
    }
}

fn check_phone_number(value: &str, errors: &mut Vec<String>) {
    let value = value.trim();
    if value.is_empty() {
        errors.push("Phone number is required".to_string());
    } else if !PHONE_PATTERN.is_match(value)
        || value.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS
    {
        errors.push("Phone number is invalid".to_string());
    }
}

fn check_address_line(value: &str, errors: &mut Vec<String>) {
    let value = value.trim();
    if value.is_empty() {
        errors.push("Address is required".to_string());
    } else if value.chars().count() < MIN_ADDRESS_LENGTH {
        errors.push(format!(
            "Address must be at least {MIN_ADDRESS_LENGTH} characters"
        ));
    }
}

fn check_postcode(value: &str, errors: &mut Vec<String>) {
    let value = value.trim();
    if value.is_empty() {
        errors.push("Postcode is required".to_string());
    } else if !POSTCODE_PATTERN.is_match(value) {
        errors.push("Postcode is invalid".to_string());
    }
}

fn check_selected_id(value: Option<i64>, label: &str, errors: &mut Vec<String>) {
    if value.is_none_or(|id| id == 0) {
        errors.push(format!("{label} is required"));
    }
}

/// Validate an address form.
#[must_use]
pub fn validate_address_form(form: &AddressForm, mode: FormMode) -> Vec<String> {
    let mut errors = Vec::new();
    check_full_name(&form.full_name, &mut errors);
    check_phone_number(&form.phone_number, &mut errors);
    check_address_line(&form.address_1, &mut errors);
    check_postcode(&form.postcode, &mut errors);

    if mode == FormMode::Create {
        check_selected_id(form.city_id.map(i64::from), "City", &mut errors);
        check_selected_id(form.country_id.map(i64::from), "Country", &mut errors);
    }

    errors
}

/// Validate a profile form.
#[must_use]
pub fn validate_profile_form(form: &ProfileForm) -> Vec<String> {
    let mut errors = Vec::new();
    check_full_name(&form.full_name, &mut errors);
    check_phone_number(&form.phone_number, &mut errors);
    errors
}

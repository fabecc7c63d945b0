//! Client-side form validation for login and signup.
//!
//! Validation runs before any network call; a form with errors never reaches
//! the backend.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

pub const STATES: &[(&str, &str)] = &[("punjab", "Punjab")];

pub const PUNJAB_DISTRICTS: &[&str] = &[
    "Amritsar",
    "Barnala",
    "Bathinda",
    "Faridkot",
    "Fatehgarh Sahib",
    "Fazilka",
    "Ferozepur",
    "Gurdaspur",
    "Hoshiarpur",
    "Jalandhar",
    "Kapurthala",
    "Ludhiana",
    "Mansa",
    "Moga",
    "Muktsar",
    "Pathankot",
    "Patiala",
    "Rupnagar",
    "Sahibzada Ajit Singh Nagar",
    "Sangrur",
    "Shahid Bhagat Singh Nagar",
    "Tarn Taran",
];

/// Districts offered for a state value, empty for unknown states.
pub fn districts_for(state: &str) -> &'static [&'static str] {
    match state {
        "punjab" => PUNJAB_DISTRICTS,
        _ => &[],
    }
}

/// Field -> message pairs, in the order the fields were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(&'static str, String)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. Only the first message per field is kept.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.errors.push((field, message.into()));
        }
    }

    /// Record `check`'s message, if any, under `field`.
    pub fn check(&mut self, field: &'static str, check: Option<&'static str>) {
        if let Some(message) = check {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static AADHAAR_REGEX: OnceLock<Regex> = OnceLock::new();

fn name_regex() -> &'static Regex {
    NAME_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z\s]+$").expect("name pattern is valid"))
}

fn aadhaar_regex() -> &'static Regex {
    AADHAAR_REGEX.get_or_init(|| Regex::new(r"^[0-9]{12}$").expect("aadhaar pattern is valid"))
}

pub fn validate_aadhaar(value: &str) -> Option<&'static str> {
    if aadhaar_regex().is_match(value) {
        None
    } else {
        Some("Please enter a valid 12-digit Aadhar number")
    }
}

pub fn validate_name(value: &str) -> Option<&'static str> {
    let len = value.chars().count();
    if len < 2 {
        Some("Name must be at least 2 characters")
    } else if len > 50 {
        Some("Name must be less than 50 characters")
    } else if !name_regex().is_match(value) {
        Some("Name can only contain letters and spaces")
    } else {
        None
    }
}

pub fn validate_password(value: &str) -> Option<&'static str> {
    if value.chars().count() < 8 {
        return Some("Password must be at least 8 characters");
    }
    let lower = value.chars().any(|c| c.is_ascii_lowercase());
    let upper = value.chars().any(|c| c.is_ascii_uppercase());
    let digit = value.chars().any(|c| c.is_ascii_digit());
    if lower && upper && digit {
        None
    } else {
        Some("Password must contain at least one uppercase letter, one lowercase letter, and one number")
    }
}

pub fn validate_otp(value: &str) -> Option<&'static str> {
    if value.chars().count() == 6 {
        None
    } else {
        Some("OTP must be 6 digits")
    }
}

/// Details collected on the first signup step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub aadhaar: String,
    pub password: String,
    pub confirm_password: String,
    pub state: String,
    pub district: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check("name", validate_name(&self.name));
        errors.check("aadhar", validate_aadhaar(&self.aadhaar));
        errors.check("password", validate_password(&self.password));
        if self.password != self.confirm_password {
            errors.add("confirmPassword", "Passwords don't match");
        }
        if self.state.is_empty() {
            errors.add("state", "Please select your state");
        }
        if self.district.is_empty() {
            errors.add("district", "Please select your district");
        }

        errors.into_result()
    }
}

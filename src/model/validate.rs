//! Field-level validation for the three record types.
//!
//! Validators are pure: they look only at the candidate record and report
//! every problem they find as a human-readable message. Uniqueness checks
//! need the rest of the collection and live in [`crate::sdk::queries`].

use regex::Regex;
use std::sync::OnceLock;

use super::{AdvertisementDraft, EnquiryDraft, UserDraft, UserPatch};

/// Outcome of validating a candidate record: every problem found, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    })
}

fn mobile_regex() -> &'static Regex {
    static MOBILE_REGEX: OnceLock<Regex> = OnceLock::new();
    MOBILE_REGEX.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("Failed to compile mobile regex"))
}

// Indian mobile numbers start with 6-9; the spreadsheet feed is full of
// landlines and short codes that must be turned away at import.
fn import_phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX
        .get_or_init(|| Regex::new(r"^[6-9][0-9]{9}$").expect("Failed to compile phone regex"))
}

fn aadhar_regex() -> &'static Regex {
    static AADHAR_REGEX: OnceLock<Regex> = OnceLock::new();
    AADHAR_REGEX
        .get_or_init(|| Regex::new(r"^[0-9]{12}$").expect("Failed to compile aadhar regex"))
}

fn pan_regex() -> &'static Regex {
    static PAN_REGEX: OnceLock<Regex> = OnceLock::new();
    PAN_REGEX
        .get_or_init(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("Failed to compile PAN regex"))
}

fn username_regex() -> &'static Regex {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"))
}

/// Validates a new enquiry before it is offered to the store.
pub fn validate_enquiry(draft: &EnquiryDraft) -> ValidationReport {
    let mut report = ValidationReport::default();

    if draft.full_name.trim().is_empty() {
        report.push("Full name is required");
    }
    if !mobile_regex().is_match(&draft.mobile) {
        report.push("Mobile number must be exactly 10 digits");
    }
    if draft.email.trim().is_empty() {
        report.push("Email is required");
    } else if !email_regex().is_match(&draft.email) {
        report.push("Invalid email format");
    }
    if draft.state.trim().is_empty() {
        report.push("State is required");
    }
    if draft.status.trim().is_empty() {
        report.push("Status is required");
    }

    report
}

/// Validates one advertisement row. PAN is checked after upper-casing,
/// which is also how it is stored.
pub fn validate_advertisement(draft: &AdvertisementDraft) -> ValidationReport {
    let mut report = ValidationReport::default();

    if draft.name.trim().len() < 2 {
        report.push("Name must be at least 2 characters long");
    }
    if !import_phone_regex().is_match(&draft.phone_no) {
        report.push("Phone number must be 10 digits starting with 6-9");
    }
    if draft.email.trim().is_empty() {
        report.push("Email is required");
    } else if !email_regex().is_match(&draft.email) {
        report.push("Invalid email format");
    }
    if let Some(aadhar) = &draft.aadhar_no {
        if !aadhar.is_empty() && !aadhar_regex().is_match(aadhar) {
            report.push("Aadhar number must be exactly 12 digits");
        }
    }
    if let Some(pan) = &draft.pan_no {
        if !pan.is_empty() && !pan_regex().is_match(&pan.to_uppercase()) {
            report.push("PAN must be 5 letters, 4 digits and a letter");
        }
    }

    report
}

/// Validates a new account. Username uniqueness is a separate probe
/// against the full collection, inactive accounts included.
pub fn validate_new_user(draft: &UserDraft) -> ValidationReport {
    let mut report = ValidationReport::default();

    validate_username(&draft.username, &mut report);
    if draft.password.len() < 6 {
        report.push("Password must be at least 6 characters long");
    }
    if draft.full_name.trim().is_empty() {
        report.push("Full name is required");
    }
    if let Some(email) = &draft.email {
        if !email.is_empty() && !email_regex().is_match(email) {
            report.push("Invalid email format");
        }
    }

    report
}

/// Validates an account edit. A blank password means "keep the current
/// one" and is not an error.
pub fn validate_user_patch(patch: &UserPatch) -> ValidationReport {
    let mut report = ValidationReport::default();

    if let Some(password) = &patch.password {
        if !password.is_empty() && password.len() < 6 {
            report.push("Password must be at least 6 characters long");
        }
    }
    if let Some(full_name) = &patch.full_name {
        if full_name.trim().is_empty() {
            report.push("Full name is required");
        }
    }
    if let Some(email) = &patch.email {
        if !email.is_empty() && !email_regex().is_match(email) {
            report.push("Invalid email format");
        }
    }

    report
}

fn validate_username(username: &str, report: &mut ValidationReport) {
    if username.len() < 3 {
        report.push("Username must be at least 3 characters long");
    } else if !username_regex().is_match(username) {
        report.push("Username can only contain letters, numbers, and underscores");
    }
}

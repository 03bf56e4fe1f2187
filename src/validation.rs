//! Form validation for master and application submissions.
//!
//! Validation checks shape and range only. Checks that need the store
//! (does the master exist, does the workload fit) run in [`crate::actions`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::models::*;

/// Largest storable amount in cents, the range of a 32-bit `INTEGER` column.
///
/// Sums over many rows must stay within SQLite's 64-bit integers.
pub const MAX_AMOUNT_CENTS: i64 = i32::MAX as i64;

/// Error messages keyed by form field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const SELECT_MASTER: &str = "Please select a master.";
pub const AMOUNT_POSITIVE: &str = "Please enter an amount greater than $0.";
pub const AMOUNT_TOO_LARGE: &str = "Please enter an amount less than $21,474,836.48.";
pub const SELECT_STATUS: &str = "Please select an application status.";
pub const COMPLEXITY_WHOLE: &str = "Please enter a whole-number complexity.";
pub const COMPLEXITY_MIN: &str = "Please enter a complexity greater than 0.";
pub const COMPLEXITY_MAX: &str = "Please enter a complexity less than 11.";
pub const NAME_REQUIRED: &str = "Please enter master name.";
pub const EMAIL_REQUIRED: &str = "This field has to be filled.";
pub const EMAIL_INVALID: &str = "This is not a valid email.";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

fn push(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// Validate an application form, coercing string fields to their types.
///
/// `amount` is given in dollars and returned in cents.
pub fn validate_application(input: &ApplicationFormInput) -> Result<ApplicationInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let master_id = input
        .master_id
        .as_deref()
        .and_then(|s| Uuid::parse_str(s.trim()).ok());
    if master_id.is_none() {
        push(&mut errors, "masterId", SELECT_MASTER);
    }

    let amount = match coerce_number(input.amount.as_deref()).map(|a| (a * 100.0).round()) {
        Some(cents) if cents > MAX_AMOUNT_CENTS as f64 => {
            push(&mut errors, "amount", AMOUNT_TOO_LARGE);
            None
        }
        Some(cents) if cents.is_finite() && cents >= 1.0 => Some(cents as i64),
        _ => {
            push(&mut errors, "amount", AMOUNT_POSITIVE);
            None
        }
    };

    let status = input
        .status
        .as_deref()
        .and_then(ApplicationStatus::from_str);
    if status.is_none() {
        push(&mut errors, "status", SELECT_STATUS);
    }

    let complexity = match coerce_number(input.complexity.as_deref()) {
        Some(c) if c.fract() != 0.0 || !c.is_finite() => {
            push(&mut errors, "complexity", COMPLEXITY_WHOLE);
            None
        }
        Some(c) => {
            let mut ok = true;
            if c <= 0.0 {
                push(&mut errors, "complexity", COMPLEXITY_MIN);
                ok = false;
            }
            if c >= 11.0 {
                push(&mut errors, "complexity", COMPLEXITY_MAX);
                ok = false;
            }
            ok.then_some(c as i64)
        }
        None => {
            push(&mut errors, "complexity", COMPLEXITY_MIN);
            None
        }
    };

    match (master_id, amount, status, complexity) {
        (Some(master_id), Some(amount), Some(status), Some(complexity)) => Ok(ApplicationInput {
            master_id,
            amount,
            status,
            complexity,
        }),
        _ => Err(errors),
    }
}

/// Validate a master form.
pub fn validate_master(input: &MasterFormInput) -> Result<MasterInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = input.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        push(&mut errors, "name", NAME_REQUIRED);
    }

    let email = input.email.as_deref().map(str::trim).unwrap_or_default();
    if email.is_empty() {
        push(&mut errors, "email", EMAIL_REQUIRED);
    }
    if !EMAIL_RE.is_match(email) {
        push(&mut errors, "email", EMAIL_INVALID);
    }

    if errors.is_empty() {
        Ok(MasterInput {
            name: name.to_string(),
            email: email.to_string(),
        })
    } else {
        Err(errors)
    }
}

/// Coerce a form value to a number. Blank values coerce to zero.
fn coerce_number(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    if value.is_empty() {
        return Some(0.0);
    }
    value.parse::<f64>().ok()
}

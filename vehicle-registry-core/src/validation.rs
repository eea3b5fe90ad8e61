//! Declarative validation engine for vehicle records
//!
//! Validation is a fixed, ordered table of field rules evaluated by a
//! generic runner. Evaluation is pure and deterministic and collects every
//! violated rule, not just the first; the order of the returned violations
//! is the declaration order of the table.

use crate::vehicle::Vehicle;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Longest accepted description
pub const MAX_DESCRIPTION_LEN: usize = 40;

/// Longest accepted plate
pub const MAX_PLATE_LEN: usize = 40;

/// Longest accepted owning username
pub const MAX_USERNAME_LEN: usize = 20;

/// Smallest accepted mileage
pub const MIN_MILEAGE: i64 = 0;

/// Largest accepted mileage
pub const MAX_MILEAGE: i64 = 9_999_999;

/// Pattern for a valid plate: 1-3 uppercase letters, 1-2 uppercase letters,
/// and a number between 1 and 999, separated by single spaces
pub const PLATE_PATTERN: &str = r"^[A-Z]{1,3} [A-Z]{1,2} [1-9][0-9]{0,2}$";

fn plate_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(PLATE_PATTERN).expect("plate pattern is a valid regex"))
}

/// Check a plate against the plate pattern
pub fn is_valid_plate(plate: &str) -> bool {
    plate_regex().is_match(plate)
}

/// A single violated field rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    /// Path of the offending field, e.g. `owner.firstName`
    pub field: &'static str,
    /// Stable message key for clients
    pub code: &'static str,
    /// Human-readable message
    pub message: &'static str,
}

struct Rule {
    field: &'static str,
    code: &'static str,
    message: &'static str,
    ok: fn(&Vehicle) -> bool,
}

fn description_present(v: &Vehicle) -> bool {
    !v.description.is_empty()
}

fn description_length(v: &Vehicle) -> bool {
    v.description.chars().count() <= MAX_DESCRIPTION_LEN
}

fn plate_present(v: &Vehicle) -> bool {
    !v.plate.is_empty()
}

fn plate_length(v: &Vehicle) -> bool {
    v.plate.chars().count() <= MAX_PLATE_LEN
}

fn plate_matches_pattern(v: &Vehicle) -> bool {
    is_valid_plate(&v.plate)
}

fn mileage_min(v: &Vehicle) -> bool {
    v.mileage >= MIN_MILEAGE
}

fn mileage_max(v: &Vehicle) -> bool {
    v.mileage <= MAX_MILEAGE
}

fn owner_first_name_present(v: &Vehicle) -> bool {
    !v.owner.first_name.is_empty()
}

fn owner_last_name_present(v: &Vehicle) -> bool {
    !v.owner.last_name.is_empty()
}

fn username_length(v: &Vehicle) -> bool {
    v.username.chars().count() <= MAX_USERNAME_LEN
}

const RULES: &[Rule] = &[
    Rule {
        field: "description",
        code: "vehicle.description.notEmpty",
        message: "Description is required.",
        ok: description_present,
    },
    Rule {
        field: "description",
        code: "vehicle.description.maxLength",
        message: "A description can be a maximum of 40 characters long.",
        ok: description_length,
    },
    Rule {
        field: "plate",
        code: "vehicle.plate.notEmpty",
        message: "Plate is required.",
        ok: plate_present,
    },
    Rule {
        field: "plate",
        code: "vehicle.plate.maxLength",
        message: "A plate can be a maximum of 40 characters long.",
        ok: plate_length,
    },
    Rule {
        field: "plate",
        code: "vehicle.plate.pattern",
        message: "A plate consists of 1-3 uppercase letters, 1-2 uppercase letters, and a number between 1 and 999.",
        ok: plate_matches_pattern,
    },
    Rule {
        field: "mileage",
        code: "vehicle.mileage.min",
        message: "The mileage value must be at least 0.",
        ok: mileage_min,
    },
    Rule {
        field: "mileage",
        code: "vehicle.mileage.max",
        message: "The mileage value must not exceed 9999999.",
        ok: mileage_max,
    },
    Rule {
        field: "owner.firstName",
        code: "owner.firstName.notEmpty",
        message: "First name is required.",
        ok: owner_first_name_present,
    },
    Rule {
        field: "owner.lastName",
        code: "owner.lastName.notEmpty",
        message: "Last name is required.",
        ok: owner_last_name_present,
    },
    Rule {
        field: "username",
        code: "vehicle.username.maxLength",
        message: "A username can be a maximum of 20 characters long.",
        ok: username_length,
    },
];

/// Evaluate every rule against the vehicle and collect all violations.
///
/// An empty result means the record is valid.
pub fn validate(vehicle: &Vehicle) -> Vec<Violation> {
    RULES
        .iter()
        .filter(|rule| !(rule.ok)(vehicle))
        .map(|rule| Violation {
            field: rule.field,
            code: rule.code,
            message: rule.message,
        })
        .collect()
}

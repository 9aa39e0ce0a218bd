//! Field rules shared by create, update, and search.

use regex::Regex;
use std::sync::LazyLock;

use super::types::{DirectoryError, FieldViolation, NewStudent, Student, StudentPatch};

/// Minimum name length in characters.
pub const NAME_MIN_CHARS: usize = 2;
/// Maximum name length in characters.
pub const NAME_MAX_CHARS: usize = 50;
/// Ages must be strictly greater than this.
pub const AGE_EXCLUSIVE_MIN: i64 = 0;
/// Ages must be strictly less than this.
pub const AGE_EXCLUSIVE_MAX: i64 = 100;
/// Minimum length of a search term in characters.
pub const SEARCH_MIN_CHARS: usize = 2;

static CLASS_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^year [0-9]{1,2}$").expect("class year pattern compiles"));

/// Check a student name against the length bounds.
pub fn validate_name(name: &str) -> Result<(), FieldViolation> {
    let chars = name.chars().count();
    if chars < NAME_MIN_CHARS {
        return Err(FieldViolation::new(
            "name",
            format!("must be at least {NAME_MIN_CHARS} characters"),
        ));
    }
    if chars > NAME_MAX_CHARS {
        return Err(FieldViolation::new(
            "name",
            format!("must be at most {NAME_MAX_CHARS} characters"),
        ));
    }
    Ok(())
}

/// Check an age and narrow it to the stored representation.
pub fn validate_age(age: i64) -> Result<u8, FieldViolation> {
    if age <= AGE_EXCLUSIVE_MIN || age >= AGE_EXCLUSIVE_MAX {
        return Err(FieldViolation::new(
            "age",
            format!("must be greater than {AGE_EXCLUSIVE_MIN} and less than {AGE_EXCLUSIVE_MAX}"),
        ));
    }
    u8::try_from(age).map_err(|_| FieldViolation::new("age", "out of range"))
}

/// Check a class year against `year N` / `year NN`.
pub fn validate_class_year(class_year: &str) -> Result<(), FieldViolation> {
    if CLASS_YEAR_RE.is_match(class_year) {
        Ok(())
    } else {
        Err(FieldViolation::new(
            "class_year",
            "must match the pattern 'year N' with 1 or 2 digits",
        ))
    }
}

/// Check the name argument of a search before it runs.
pub fn validate_search_term(term: &str) -> Result<(), DirectoryError> {
    if term.chars().count() < SEARCH_MIN_CHARS {
        return Err(DirectoryError::Validation(vec![FieldViolation::new(
            "name",
            format!("search term must be at least {SEARCH_MIN_CHARS} characters"),
        )]));
    }
    Ok(())
}

/// Validate every field of a create candidate, collecting all violations.
///
/// `assign_id` runs only once every field has passed and the candidate carries no id of its
/// own, so rejected candidates never consume a generated id. A caller-supplied id must not be
/// blank.
pub(crate) fn validate_candidate<F>(
    candidate: NewStudent,
    assign_id: F,
) -> Result<Student, DirectoryError>
where
    F: FnOnce() -> Result<String, DirectoryError>,
{
    let mut violations = Vec::new();

    if candidate.id.as_deref().is_some_and(|id| id.trim().is_empty()) {
        violations.push(FieldViolation::new("id", "must not be empty"));
    }
    if let Err(violation) = validate_name(&candidate.name) {
        violations.push(violation);
    }
    let age = validate_age(candidate.age).map_err(|violation| violations.push(violation));
    if let Err(violation) = validate_class_year(&candidate.class_year) {
        violations.push(violation);
    }

    let age = match age {
        Ok(age) if violations.is_empty() => age,
        _ => return Err(DirectoryError::Validation(violations)),
    };
    let id = match candidate.id {
        Some(id) => id,
        None => assign_id()?,
    };

    Ok(Student {
        id,
        name: candidate.name,
        age,
        class_year: candidate.class_year,
    })
}

/// Apply a patch to a copy of `current`, validating each present field.
///
/// The original is never touched; on failure no change is visible to the caller.
pub(crate) fn apply_patch(
    current: &Student,
    patch: StudentPatch,
) -> Result<Student, DirectoryError> {
    let mut updated = current.clone();
    let mut violations = Vec::new();

    match patch.name {
        None => {}
        Some(None) => violations.push(FieldViolation::new("name", "cannot be null")),
        Some(Some(name)) => match validate_name(&name) {
            Ok(()) => updated.name = name,
            Err(violation) => violations.push(violation),
        },
    }

    match patch.age {
        None => {}
        Some(None) => violations.push(FieldViolation::new("age", "cannot be null")),
        Some(Some(age)) => match validate_age(age) {
            Ok(age) => updated.age = age,
            Err(violation) => violations.push(violation),
        },
    }

    match patch.class_year {
        None => {}
        Some(None) => violations.push(FieldViolation::new("class_year", "cannot be null")),
        Some(Some(class_year)) => match validate_class_year(&class_year) {
            Ok(()) => updated.class_year = class_year,
            Err(violation) => violations.push(violation),
        },
    }

    if violations.is_empty() {
        Ok(updated)
    } else {
        Err(DirectoryError::Validation(violations))
    }
}

//! Core record types and error definitions for the student directory.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A stored student record.
///
/// Every value of this type held by the directory has passed field validation, so `age` is
/// narrowed to `u8` and the string fields are known to satisfy their constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(example = "student_example")]
pub struct Student {
    /// Unique student identifier.
    pub id: String,
    /// Display name, 2 to 50 characters.
    #[schemars(length(min = 2, max = 50))]
    pub name: String,
    /// Age in years, between 1 and 99.
    #[schemars(range(min = 1, max = 99))]
    pub age: u8,
    /// Class year in the form `year N` or `year NN`.
    #[schemars(regex(pattern = r"^year [0-9]{1,2}$"))]
    pub class_year: String,
}

/// Candidate record accepted by the create operation.
///
/// `age` is kept wide here so out-of-range numbers reach validation instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(example = "new_student_example")]
pub struct NewStudent {
    /// Optional caller-supplied identifier; generated when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name, 2 to 50 characters.
    #[schemars(length(min = 2, max = 50))]
    pub name: String,
    /// Age in years, strictly between 0 and 100.
    #[schemars(range(min = 1, max = 99))]
    pub age: i64,
    /// Class year in the form `year N` or `year NN`.
    #[schemars(regex(pattern = r"^year [0-9]{1,2}$"))]
    pub class_year: String,
}

impl NewStudent {
    /// Build a candidate without an identifier.
    pub fn new(name: impl Into<String>, age: i64, class_year: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
            class_year: class_year.into(),
        }
    }

    /// Attach a caller-supplied identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Partial update applied to an existing student.
///
/// Each field distinguishes "omitted" (`None`) from "explicitly null" (`Some(None)`). Omitted
/// fields are left untouched; explicit nulls are rejected because no field may be cleared.
/// Identifiers are not part of the patch and any `id` key in the payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct StudentPatch {
    /// New display name.
    #[serde(default, deserialize_with = "present")]
    #[schemars(with = "Option<String>", length(min = 2, max = 50))]
    pub name: Option<Option<String>>,
    /// New age in years.
    #[serde(default, deserialize_with = "present")]
    #[schemars(with = "Option<i64>", range(min = 1, max = 99))]
    pub age: Option<Option<i64>>,
    /// New class year. Older clients send this as `class_`.
    #[serde(default, alias = "class_", deserialize_with = "present")]
    #[schemars(with = "Option<String>", regex(pattern = r"^year [0-9]{1,2}$"))]
    pub class_year: Option<Option<String>>,
}

impl StudentPatch {
    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Some(name.into()));
        self
    }

    /// Set the age.
    pub fn age(mut self, age: i64) -> Self {
        self.age = Some(Some(age));
        self
    }

    /// Set the class year.
    pub fn class_year(mut self, class_year: impl Into<String>) -> Self {
        self.class_year = Some(Some(class_year.into()));
        self
    }

    /// Returns true when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.class_year.is_none()
    }
}

// Only invoked when the key is present, so a JSON `null` becomes `Some(None)`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct FieldViolation {
    /// External name of the offending field.
    pub field: String,
    /// Human-readable explanation of the constraint.
    pub message: String,
}

impl FieldViolation {
    pub(crate) fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors emitted by directory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// No student is stored under the requested identifier.
    #[error("Student with ID {0} not found")]
    StudentNotFound(String),
    /// A name search matched no students.
    #[error("No students found with name '{0}'")]
    NameNotFound(String),
    /// One or more fields violated their constraints; nothing was stored.
    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),
    /// Create was given an identifier that is already in use.
    #[error("Student with ID {0} already exists")]
    Conflict(String),
}

impl DirectoryError {
    /// Returns true for either not-found variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::StudentNotFound(_) | Self::NameNotFound(_))
    }

    /// Field violations carried by a validation failure, empty otherwise.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation(violations) => violations,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn student_example() -> Student {
    Student {
        id: "550e8400-e29b-41d4-a716-446655440000".into(),
        name: "Jane Doe".into(),
        age: 15,
        class_year: "year 11".into(),
    }
}

fn new_student_example() -> NewStudent {
    NewStudent::new("Jane Doe", 15, "year 11")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_distinguishes_omitted_from_null() {
        let patch: StudentPatch = serde_json::from_value(json!({ "age": null })).expect("patch");
        assert_eq!(patch.age, Some(None));
        assert_eq!(patch.name, None);
        assert_eq!(patch.class_year, None);
    }

    #[test]
    fn patch_accepts_legacy_class_key() {
        let patch: StudentPatch =
            serde_json::from_value(json!({ "class_": "year 9" })).expect("patch");
        assert_eq!(patch.class_year, Some(Some("year 9".into())));
    }

    #[test]
    fn patch_ignores_identifier() {
        let patch: StudentPatch =
            serde_json::from_value(json!({ "id": "other", "name": "Ana" })).expect("patch");
        assert_eq!(patch, StudentPatch::default().name("Ana"));
    }

    #[test]
    fn new_student_id_is_optional() {
        let candidate: NewStudent = serde_json::from_value(json!({
            "name": "Jane Doe",
            "age": 15,
            "class_year": "year 11"
        }))
        .expect("candidate");
        assert_eq!(candidate, NewStudent::new("Jane Doe", 15, "year 11"));
    }

    #[test]
    fn validation_message_lists_every_field() {
        let err = DirectoryError::Validation(vec![
            FieldViolation::new("name", "too short"),
            FieldViolation::new("age", "too old"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: name: too short; age: too old"
        );
        assert_eq!(err.violations().len(), 2);
        assert!(!err.is_not_found());
    }
}

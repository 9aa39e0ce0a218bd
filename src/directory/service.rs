//! Student directory coordinating validation, id assignment, and the in-memory store.

use crate::directory::{
    ids::{IdGenerator, UuidGenerator},
    types::{DirectoryError, NewStudent, Student, StudentPatch},
    validate::{apply_patch, validate_candidate, validate_search_term},
};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Upper bound on draws when a generated id collides with a stored one.
const MAX_ID_ATTEMPTS: usize = 16;

/// How create treats a caller-supplied id that is already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreatePolicy {
    /// Fail with [`DirectoryError::Conflict`].
    #[default]
    Reject,
    /// Replace the stored record in place.
    Upsert,
}

/// Abstraction over the directory used by external surfaces (HTTP, tests).
pub trait DirectoryApi: Send + Sync {
    /// All students in insertion order.
    fn list_all(&self) -> Vec<Student>;

    /// Look up one student by id.
    fn get_by_id(&self, id: &str) -> Result<Student, DirectoryError>;

    /// Case-insensitive exact match on name. An empty result is an error.
    fn search_by_name(&self, name: &str) -> Result<Vec<Student>, DirectoryError>;

    /// Validate and store a new student, assigning an id when none is supplied.
    fn create(&self, candidate: NewStudent) -> Result<Student, DirectoryError>;

    /// Merge a validated patch into an existing student.
    fn update(&self, id: &str, patch: StudentPatch) -> Result<Student, DirectoryError>;

    /// Remove a student.
    fn delete(&self, id: &str) -> Result<(), DirectoryError>;
}

/// In-memory id → student mapping that remembers insertion order.
#[derive(Default)]
struct Store {
    records: HashMap<String, Student>,
    order: Vec<String>,
}

impl Store {
    fn insert(&mut self, student: Student) {
        if !self.records.contains_key(&student.id) {
            self.order.push(student.id.clone());
        }
        self.records.insert(student.id.clone(), student);
    }

    fn remove(&mut self, id: &str) -> Option<Student> {
        let removed = self.records.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    fn iter(&self) -> impl Iterator<Item = &Student> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }
}

/// Owns the student store and serves the directory operations.
///
/// Construct once near process start and share it through an `Arc`. Every read-modify-write runs
/// under a single write guard, so concurrent handlers cannot lose updates.
pub struct StudentDirectory {
    store: RwLock<Store>,
    ids: Box<dyn IdGenerator>,
    policy: CreatePolicy,
}

impl Default for StudentDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentDirectory {
    /// Empty directory with random UUID ids that rejects duplicate ids on create.
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::default()),
            ids: Box::new(UuidGenerator),
            policy: CreatePolicy::default(),
        }
    }

    /// Replace the id generation strategy.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replace the duplicate-id policy for create.
    pub fn with_create_policy(mut self, policy: CreatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of stored students.
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    /// Returns true when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the guard cannot leave a half-applied record behind, since
    // mutations are committed with a single insert or remove.
    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_id(&self, store: &Store) -> Result<String, DirectoryError> {
        let mut last = String::new();
        for _ in 0..MAX_ID_ATTEMPTS {
            last = self.ids.next_id();
            if !store.records.contains_key(&last) {
                return Ok(last);
            }
            tracing::debug!(id = %last, "Generated id already in use; drawing again");
        }
        Err(DirectoryError::Conflict(last))
    }
}

impl DirectoryApi for StudentDirectory {
    fn list_all(&self) -> Vec<Student> {
        let students: Vec<Student> = self.read().iter().cloned().collect();
        tracing::debug!(count = students.len(), "Listed students");
        students
    }

    fn get_by_id(&self, id: &str) -> Result<Student, DirectoryError> {
        self.read()
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| DirectoryError::StudentNotFound(id.to_string()))
    }

    fn search_by_name(&self, name: &str) -> Result<Vec<Student>, DirectoryError> {
        validate_search_term(name)?;
        let needle = name.to_lowercase();
        let matches: Vec<Student> = self
            .read()
            .iter()
            .filter(|student| student.name.to_lowercase() == needle)
            .cloned()
            .collect();
        tracing::debug!(name, matches = matches.len(), "Searched students by name");
        if matches.is_empty() {
            return Err(DirectoryError::NameNotFound(name.to_string()));
        }
        Ok(matches)
    }

    fn create(&self, candidate: NewStudent) -> Result<Student, DirectoryError> {
        let mut store = self.write();
        let student = validate_candidate(candidate, || self.fresh_id(&store))?;

        if store.records.contains_key(&student.id) {
            match self.policy {
                CreatePolicy::Reject => {
                    tracing::warn!(id = %student.id, "Rejected create with duplicate id");
                    return Err(DirectoryError::Conflict(student.id));
                }
                CreatePolicy::Upsert => {
                    tracing::info!(id = %student.id, "Overwriting existing student on create");
                }
            }
        }

        store.insert(student.clone());
        tracing::info!(id = %student.id, total = store.records.len(), "Created student");
        Ok(student)
    }

    fn update(&self, id: &str, patch: StudentPatch) -> Result<Student, DirectoryError> {
        if patch.is_empty() {
            tracing::debug!(id, "Empty patch; returning stored student");
            return self.get_by_id(id);
        }
        let mut store = self.write();
        let current = store
            .records
            .get(id)
            .ok_or_else(|| DirectoryError::StudentNotFound(id.to_string()))?;
        let updated = apply_patch(current, patch)?;
        store.insert(updated.clone());
        tracing::info!(id, "Updated student");
        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<(), DirectoryError> {
        let mut store = self.write();
        store
            .remove(id)
            .ok_or_else(|| DirectoryError::StudentNotFound(id.to_string()))?;
        tracing::info!(id, remaining = store.records.len(), "Deleted student");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::ids::SequentialIds;

    fn directory() -> StudentDirectory {
        StudentDirectory::new().with_id_generator(SequentialIds::new("s"))
    }

    fn jane() -> NewStudent {
        NewStudent::new("Jane Doe", 15, "year 11")
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let directory = directory();
        assert!(directory.list_all().is_empty());
        assert!(directory.is_empty());
    }

    #[test]
    fn create_assigns_id_and_stores_record() {
        let directory = directory();
        let created = directory.create(jane()).expect("create");
        assert_eq!(created.id, "s-1");
        assert_eq!(created.name, "Jane Doe");
        assert_eq!(created.age, 15);
        assert_eq!(created.class_year, "year 11");
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.get_by_id("s-1").expect("get"), created);
    }

    #[test]
    fn create_with_default_generator_uses_uuid() {
        let directory = StudentDirectory::new();
        let created = directory.create(jane()).expect("create");
        assert!(uuid::Uuid::parse_str(&created.id).is_ok());
    }

    #[test]
    fn create_keeps_supplied_id() {
        let directory = directory();
        let created = directory.create(jane().with_id("custom")).expect("create");
        assert_eq!(created.id, "custom");
    }

    #[test]
    fn create_rejects_duplicate_supplied_id() {
        let directory = directory();
        directory.create(jane().with_id("dup")).expect("first");
        let err = directory
            .create(NewStudent::new("Other", 20, "year 2").with_id("dup"))
            .expect_err("duplicate");
        assert_eq!(err, DirectoryError::Conflict("dup".into()));
        assert_eq!(directory.get_by_id("dup").expect("get").name, "Jane Doe");
    }

    #[test]
    fn upsert_policy_overwrites_in_place() {
        let directory = directory().with_create_policy(CreatePolicy::Upsert);
        directory.create(jane().with_id("a")).expect("a");
        directory.create(jane().with_id("b")).expect("b");
        directory
            .create(NewStudent::new("Replaced", 20, "year 2").with_id("a"))
            .expect("upsert");
        let names: Vec<_> = directory.list_all().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Replaced", "Jane Doe"]);
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn generated_id_skips_taken_values() {
        let directory = directory();
        directory.create(jane().with_id("s-1")).expect("taken");
        let created = directory.create(jane()).expect("generated");
        assert_eq!(created.id, "s-2");
    }

    #[test]
    fn invalid_create_stores_nothing() {
        let directory = directory();
        let err = directory
            .create(NewStudent::new("Jane", 100, "year 11"))
            .expect_err("invalid");
        assert!(matches!(err, DirectoryError::Validation(_)));
        assert!(directory.is_empty());
    }

    #[test]
    fn list_preserves_insertion_order() {
        let directory = directory();
        for name in ["Charlie", "Alice", "Bob"] {
            directory
                .create(NewStudent::new(name, 12, "year 7"))
                .expect("create");
        }
        let names: Vec<_> = directory.list_all().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Charlie", "Alice", "Bob"]);
    }

    #[test]
    fn get_missing_reports_id() {
        let err = directory().get_by_id("nonexistent").expect_err("missing");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("nonexistent"));
    }

    #[test]
    fn search_is_case_insensitive_and_exact() {
        let directory = directory();
        directory.create(jane()).expect("jane");
        directory
            .create(NewStudent::new("jane doe", 16, "year 10"))
            .expect("jane lower");
        directory
            .create(NewStudent::new("Jane Doerr", 16, "year 10"))
            .expect("jane doerr");

        let lower = directory.search_by_name("jane doe").expect("lower");
        let upper = directory.search_by_name("JANE DOE").expect("upper");
        assert_eq!(lower, upper);
        assert_eq!(lower.len(), 2);
    }

    #[test]
    fn search_without_match_is_not_found() {
        let directory = directory();
        directory.create(jane()).expect("jane");
        let err = directory.search_by_name("Jane").expect_err("no exact match");
        assert_eq!(err, DirectoryError::NameNotFound("Jane".into()));
    }

    #[test]
    fn short_search_term_is_validation_error() {
        let err = directory().search_by_name("J").expect_err("short");
        assert!(matches!(err, DirectoryError::Validation(_)));
    }

    #[test]
    fn update_merges_and_keeps_id() {
        let directory = directory();
        let created = directory.create(jane()).expect("create");
        let updated = directory
            .update(&created.id, StudentPatch::default().age(18))
            .expect("update");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.age, 18);
        assert_eq!(updated.name, "Jane Doe");
        assert_eq!(updated.class_year, "year 11");
        assert_eq!(directory.get_by_id(&created.id).expect("get"), updated);
    }

    #[test]
    fn empty_update_returns_record_unchanged() {
        let directory = directory();
        let created = directory.create(jane()).expect("create");
        let updated = directory
            .update(&created.id, StudentPatch::default())
            .expect("update");
        assert_eq!(updated, created);
    }

    #[test]
    fn failed_update_leaves_record_untouched() {
        let directory = directory();
        let created = directory.create(jane()).expect("create");
        let patch = StudentPatch::default().name("Janet").class_year("year 123");
        assert!(directory.update(&created.id, patch).is_err());
        assert_eq!(directory.get_by_id(&created.id).expect("get"), created);
    }

    #[test]
    fn rejected_create_does_not_consume_generated_id() {
        let directory = directory();
        assert!(directory.create(NewStudent::new("J", 15, "year 11")).is_err());
        assert!(directory.create(NewStudent::new("Jane", 0, "year 11")).is_err());
        let created = directory.create(jane()).expect("create");
        assert_eq!(created.id, "s-1");
    }

    #[test]
    fn empty_update_of_missing_is_not_found() {
        let err = directory()
            .update("ghost", StudentPatch::default())
            .expect_err("missing");
        assert_eq!(err, DirectoryError::StudentNotFound("ghost".into()));
    }

    #[test]
    fn update_missing_is_not_found() {
        let err = directory()
            .update("ghost", StudentPatch::default().age(20))
            .expect_err("missing");
        assert_eq!(err, DirectoryError::StudentNotFound("ghost".into()));
    }

    #[test]
    fn delete_removes_record() {
        let directory = directory();
        let created = directory.create(jane()).expect("create");
        directory.delete(&created.id).expect("delete");
        assert!(directory.get_by_id(&created.id).is_err());
        assert!(directory.list_all().is_empty());
        assert!(directory.delete(&created.id).is_err());
    }

    #[test]
    fn recreate_after_delete_appends() {
        let directory = directory();
        directory.create(jane().with_id("a")).expect("a");
        directory.create(jane().with_id("b")).expect("b");
        directory.delete("a").expect("delete");
        directory.create(jane().with_id("a")).expect("a again");
        let ids: Vec<_> = directory.list_all().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}

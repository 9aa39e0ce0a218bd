//! Sample records loaded at startup.

use super::{
    service::DirectoryApi,
    types::{DirectoryError, NewStudent},
};

/// The two students the service ships with.
pub fn sample_students() -> Vec<NewStudent> {
    vec![
        NewStudent::new("John", 17, "year 12").with_id("550e8400-e29b-41d4-a716-446655440000"),
        NewStudent::new("Jane", 16, "year 11").with_id("f47ac10b-58cc-4372-a567-0e02b2c3d479"),
    ]
}

/// Insert the sample students, returning how many were stored.
pub fn load_samples<D>(directory: &D) -> Result<usize, DirectoryError>
where
    D: DirectoryApi + ?Sized,
{
    let samples = sample_students();
    let count = samples.len();
    for candidate in samples {
        directory.create(candidate)?;
    }
    tracing::info!(count, "Loaded sample students");
    Ok(count)
}

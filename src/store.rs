use crate::{
    data::student::{Student, StudentFields, StudentId, StudentUpdate},
    error::RosterResult,
};
use async_trait::async_trait;

pub mod http;

/// The remote collection of students. Every operation is a single request with no retries.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self) -> RosterResult<Vec<Student>>;
    async fn create(&self, fields: StudentFields) -> RosterResult<()>;
    /// Fails if `update.id` does not exist.
    async fn update(&self, update: StudentUpdate) -> RosterResult<()>;
    /// Fails if `id` does not exist.
    async fn delete(&self, id: StudentId) -> RosterResult<()>;
}

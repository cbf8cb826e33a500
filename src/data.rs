use crate::error::StudentsResult;
use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

pub mod memory;
pub mod postgres;
pub mod student;

pub use student::{Student, StudentForm, StudentInput};

/// Collection-style access to stored students.
///
/// Every write is durable once the returned future resolves. Absence is reported through
/// `Option`/`bool`, never as an error, so callers can tell "not there" from "storage broke".
#[async_trait]
pub trait StudentStore: Debug + Send + Sync {
    async fn list(&self) -> StudentsResult<Vec<Student>>;
    async fn get_by_id(&self, id: Uuid) -> StudentsResult<Option<Student>>;
    async fn add(&self, student: Student) -> StudentsResult<Student>;
    /// Overwrites every field of the student with the same id. `None` if there is no such student.
    async fn update(&self, student: Student) -> StudentsResult<Option<Student>>;
    /// `false` if there was nothing to remove.
    async fn remove(&self, id: Uuid) -> StudentsResult<bool>;
    async fn close(&self);
}

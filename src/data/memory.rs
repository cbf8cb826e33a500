use crate::{
    data::{Student, StudentStore},
    error::StudentsResult,
};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Keeps students in process memory, gone on restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStudentStore {
    students: Arc<RwLock<HashMap<Uuid, Student>>>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn list(&self) -> StudentsResult<Vec<Student>> {
        Ok(self.students.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, id: Uuid) -> StudentsResult<Option<Student>> {
        Ok(self.students.read().await.get(&id).cloned())
    }

    async fn add(&self, student: Student) -> StudentsResult<Student> {
        self.students
            .write()
            .await
            .insert(student.id, student.clone());
        Ok(student)
    }

    async fn update(&self, student: Student) -> StudentsResult<Option<Student>> {
        let mut students = self.students.write().await;
        let Some(existing) = students.get_mut(&student.id) else {
            return Ok(None);
        };
        *existing = student.clone();
        Ok(Some(student))
    }

    async fn remove(&self, id: Uuid) -> StudentsResult<bool> {
        Ok(self.students.write().await.remove(&id).is_some())
    }

    async fn close(&self) {}
}

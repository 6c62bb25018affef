/*
 * Mentor core project
 *
 * Copyright 2023-2025 Maxim Menshikov
 *
 * Permission is hereby granted, free of charge, to any person obtaining
 * a copy of this software and associated documentation files (the “Software”),
 * to deal in the Software without restriction, including without limitation
 * the rights to use, copy, modify, merge, publish, distribute, sublicense,
 * and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included
 * in all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS
 * OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
 * DEALINGS IN THE SOFTWARE.
 */
use crate::data_model::mentor::Mentor;
use crate::data_model::record_id::RecordId;
use crate::data_model::student::Student;
use crate::data_model::summary::Summary;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write.
    #[error("duplicate value for unique field {field}")]
    Duplicate { field: String },

    #[error("store state is poisoned")]
    Poisoned,

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error(transparent)]
    Decode(#[from] mongodb::bson::de::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence seam holding the `mentors` and `students` collections.
///
/// Writes are atomic per document only; nothing here spans records.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_mentor(&self, name: &str) -> StoreResult<Mentor>;
    /// New students start without a mentor. A present email must be unique
    /// among students that have one.
    async fn insert_student(&self, name: &str, email: Option<&str>) -> StoreResult<Student>;

    async fn find_mentor(&self, id: RecordId) -> StoreResult<Option<Mentor>>;
    async fn find_student(&self, id: RecordId) -> StoreResult<Option<Student>>;

    async fn list_mentors(&self) -> StoreResult<Vec<Summary>>;
    async fn list_students(&self) -> StoreResult<Vec<Summary>>;
    async fn find_students_by_mentor(&self, mentor: RecordId) -> StoreResult<Vec<Student>>;

    /// Point every listed student at `mentor`. Returns how many documents
    /// actually changed.
    async fn set_mentor_many(&self, students: &[RecordId], mentor: RecordId) -> StoreResult<u64>;
    async fn set_mentor(&self, student: RecordId, mentor: RecordId) -> StoreResult<()>;

    /// Student with its mentor reference resolved. The mentor is `None` when
    /// the reference is unset or points at a record that no longer exists.
    async fn find_student_with_mentor(
        &self,
        id: RecordId,
    ) -> StoreResult<Option<(Student, Option<Mentor>)>> {
        let student = match self.find_student(id).await? {
            Some(s) => s,
            None => return Ok(None),
        };

        let mentor = match student.mentor {
            Some(mentor_id) => self.find_mentor(mentor_id).await?,
            None => None,
        };

        Ok(Some((student, mentor)))
    }
}

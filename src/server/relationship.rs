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
use crate::server::error::{IdKind, NotFoundSubject, ServiceError};
use crate::state::store::Store;
use log::{error, info};
use std::sync::Arc;

pub type ServiceResult<T> = Result<T, ServiceError>;

fn parse_id(kind: IdKind, raw: &str) -> ServiceResult<RecordId> {
    RecordId::parse(raw).map_err(|_| ServiceError::InvalidId(kind, raw.to_string()))
}

/// Parse all of `raw`, reporting every malformed entry at once.
fn parse_ids(kind: IdKind, raw: &[String]) -> ServiceResult<Vec<RecordId>> {
    let mut ids = Vec::with_capacity(raw.len());
    let mut invalid = Vec::new();

    for r in raw {
        match RecordId::parse(r) {
            Ok(id) => ids.push(id),
            Err(_) => invalid.push(r.clone()),
        }
    }

    if invalid.is_empty() {
        Ok(ids)
    } else {
        Err(ServiceError::InvalidIds(kind, invalid))
    }
}

fn log_failure<T>(what: &str, res: ServiceResult<T>) -> ServiceResult<T> {
    match &res {
        Err(ServiceError::Storage(e)) => error!("Error {}: {}", what, e),
        Err(ServiceError::NotFound(subject)) => {
            info!("Not found while {}: {}", what, subject.label())
        }
        _ => {}
    }
    res
}

/// Mentor/student bookkeeping on top of a [`Store`].
///
/// Identifiers come in as raw strings and are validated before the store
/// is touched. The store is never retried; its failures surface directly.
#[derive(Clone)]
pub struct RelationshipService {
    rw: Arc<dyn Store>,
}

impl RelationshipService {
    pub fn new(rw: Arc<dyn Store>) -> Self {
        Self { rw }
    }

    pub async fn create_mentor(&self, name: &str) -> ServiceResult<Mentor> {
        let res = self.rw.insert_mentor(name).await.map_err(ServiceError::from);
        if let Ok(ref m) = res {
            info!("Created mentor {} ({})", m.id, m.name);
        }
        log_failure("creating mentor", res)
    }

    pub async fn create_student(&self, name: &str, email: Option<&str>) -> ServiceResult<Student> {
        let res = self
            .rw
            .insert_student(name, email)
            .await
            .map_err(ServiceError::from);
        match res {
            Ok(ref s) => info!("Created student {} ({})", s.id, s.name),
            Err(ServiceError::DuplicateEmail) => {
                info!("Duplicate email for new student {}", name)
            }
            Err(_) => {}
        }
        log_failure("creating student", res)
    }

    pub async fn list_mentors(&self) -> ServiceResult<Vec<Summary>> {
        let res = self.rw.list_mentors().await.map_err(ServiceError::from);
        log_failure("fetching mentors", res)
    }

    pub async fn list_students(&self) -> ServiceResult<Vec<Summary>> {
        let res = self.rw.list_students().await.map_err(ServiceError::from);
        log_failure("fetching students", res)
    }

    /// Point every listed student at the mentor. Unknown student ids are
    /// ignored by the update itself; the call only fails when nothing
    /// changed at all.
    pub async fn assign_students_to_mentor(
        &self,
        mentor_id: &str,
        student_ids: &[String],
    ) -> ServiceResult<()> {
        info!("Received mentorId: {}", mentor_id);
        info!("Received studentIds: {}", student_ids.join(","));

        let mentor = parse_id(IdKind::Mentor, mentor_id)?;
        let students = parse_ids(IdKind::Student, student_ids)?;

        let res = self.do_assign(mentor, &students).await;
        log_failure("assigning students to mentor", res)
    }

    async fn do_assign(&self, mentor: RecordId, students: &[RecordId]) -> ServiceResult<()> {
        if self.rw.find_mentor(mentor).await?.is_none() {
            return Err(ServiceError::NotFound(NotFoundSubject::Mentor));
        }

        let modified = self.rw.set_mentor_many(students, mentor).await?;
        info!("Update result: {} of {} students modified", modified, students.len());

        if modified == 0 {
            return Err(ServiceError::NotFound(NotFoundSubject::UpdatedStudents));
        }
        Ok(())
    }

    /// Move one student to another mentor. The target mentor is not looked
    /// up, so a well-formed but unknown id is stored as is.
    pub async fn reassign_student_mentor(
        &self,
        student_id: &str,
        mentor_id: &str,
    ) -> ServiceResult<()> {
        let student = parse_id(IdKind::Student, student_id)?;
        let mentor = parse_id(IdKind::Mentor, mentor_id)?;

        let res = self.do_reassign(student, mentor).await;
        log_failure("changing mentor", res)
    }

    async fn do_reassign(&self, student: RecordId, mentor: RecordId) -> ServiceResult<()> {
        if self.rw.find_student(student).await?.is_none() {
            return Err(ServiceError::NotFound(NotFoundSubject::Student));
        }

        self.rw.set_mentor(student, mentor).await?;
        info!("Student {} now has mentor {}", student, mentor);
        Ok(())
    }

    pub async fn get_mentor_for_student(&self, student_id: &str) -> ServiceResult<Mentor> {
        let student = parse_id(IdKind::Student, student_id)?;

        let res = match self.rw.find_student_with_mentor(student).await {
            Ok(Some((_, Some(mentor)))) => Ok(mentor),
            Ok(Some((_, None))) => Err(ServiceError::NotFound(NotFoundSubject::AssignedMentor)),
            Ok(None) => Err(ServiceError::NotFound(NotFoundSubject::Student)),
            Err(e) => Err(e.into()),
        };
        log_failure("fetching mentor for student", res)
    }

    pub async fn get_students_for_mentor(&self, mentor_id: &str) -> ServiceResult<Vec<Student>> {
        let mentor = parse_id(IdKind::Mentor, mentor_id)?;

        let res = self
            .rw
            .find_students_by_mentor(mentor)
            .await
            .map_err(ServiceError::from);
        log_failure("fetching students for mentor", res)
    }
}

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
use crate::state::store::{Store, StoreError, StoreResult};
use async_trait::async_trait;
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Collections {
    mentors: BTreeMap<RecordId, Mentor>,
    students: BTreeMap<RecordId, Student>,
}

/// In-process store. Record ids are generated in creation order, so the
/// maps iterate the way a document store returns a full scan.
#[derive(Debug, Default)]
pub struct StoreLocal {
    collections: Mutex<Collections>,
}

impl StoreLocal {
    pub fn new() -> Self {
        info!("Using in-memory store");
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Collections>> {
        self.collections.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl Store for StoreLocal {
    async fn insert_mentor(&self, name: &str) -> StoreResult<Mentor> {
        let mentor = Mentor::new(name);
        self.lock()?.mentors.insert(mentor.id, mentor.clone());
        debug!("mentors: inserted {}", mentor.id);
        Ok(mentor)
    }

    async fn insert_student(&self, name: &str, email: Option<&str>) -> StoreResult<Student> {
        let mut colls = self.lock()?;
        if let Some(email) = email {
            let taken = colls
                .students
                .values()
                .any(|s| s.email.as_deref() == Some(email));
            if taken {
                return Err(StoreError::Duplicate {
                    field: "email".to_string(),
                });
            }
        }

        let student = Student::new(name, email);
        colls.students.insert(student.id, student.clone());
        debug!("students: inserted {}", student.id);
        Ok(student)
    }

    async fn find_mentor(&self, id: RecordId) -> StoreResult<Option<Mentor>> {
        Ok(self.lock()?.mentors.get(&id).cloned())
    }

    async fn find_student(&self, id: RecordId) -> StoreResult<Option<Student>> {
        Ok(self.lock()?.students.get(&id).cloned())
    }

    async fn list_mentors(&self) -> StoreResult<Vec<Summary>> {
        Ok(self.lock()?.mentors.values().map(Summary::from).collect())
    }

    async fn list_students(&self) -> StoreResult<Vec<Summary>> {
        Ok(self.lock()?.students.values().map(Summary::from).collect())
    }

    async fn find_students_by_mentor(&self, mentor: RecordId) -> StoreResult<Vec<Student>> {
        Ok(self
            .lock()?
            .students
            .values()
            .filter(|s| s.mentor == Some(mentor))
            .cloned()
            .collect())
    }

    async fn set_mentor_many(&self, students: &[RecordId], mentor: RecordId) -> StoreResult<u64> {
        let mut colls = self.lock()?;
        let targets: BTreeSet<&RecordId> = students.iter().collect();
        let mut modified = 0;

        for id in targets {
            if let Some(student) = colls.students.get_mut(id) {
                if student.mentor != Some(mentor) {
                    student.mentor = Some(mentor);
                    modified += 1;
                }
            }
        }

        Ok(modified)
    }

    async fn set_mentor(&self, student: RecordId, mentor: RecordId) -> StoreResult<()> {
        if let Some(s) = self.lock()?.students.get_mut(&student) {
            s.mentor = Some(mentor);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn email_is_unique_only_when_present() {
        let store = StoreLocal::new();
        store.insert_student("A", Some("a@x.org")).await.unwrap();
        store.insert_student("B", None).await.unwrap();
        store.insert_student("C", None).await.unwrap();

        let err = store.insert_student("D", Some("a@x.org")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref field } if field == "email"));
        assert_eq!(store.list_students().await.unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn bulk_set_counts_only_changed_documents() {
        let store = StoreLocal::new();
        let mentor = store.insert_mentor("M").await.unwrap();
        let a = store.insert_student("A", None).await.unwrap();
        let b = store.insert_student("B", None).await.unwrap();

        let ids = [a.id, b.id, a.id, RecordId::new()];
        assert_eq!(store.set_mentor_many(&ids, mentor.id).await.unwrap(), 2);
        assert_eq!(store.set_mentor_many(&ids, mentor.id).await.unwrap(), 0);
        assert_eq!(store.set_mentor_many(&[], mentor.id).await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn listings_follow_creation_order() {
        let store = StoreLocal::new();
        for name in ["first", "second", "third"] {
            store.insert_mentor(name).await.unwrap();
        }

        let names: Vec<String> = store
            .list_mentors()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[actix_web::test]
    async fn dangling_reference_resolves_to_no_mentor() {
        let store = StoreLocal::new();
        let student = store.insert_student("A", None).await.unwrap();
        store.set_mentor(student.id, RecordId::new()).await.unwrap();

        let (found, mentor) = store
            .find_student_with_mentor(student.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, student.id);
        assert!(found.mentor.is_some());
        assert!(mentor.is_none());
        assert!(store
            .find_student_with_mentor(RecordId::new())
            .await
            .unwrap()
            .is_none());
    }
}

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
use futures_util::TryStreamExt;
use log::{debug, info};
use mongodb::bson::{doc, from_document, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

const MENTORS: &str = "mentors";
const STUDENTS: &str = "students";

/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MentorDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
}

// Unset optionals must be left out of the document entirely: the sparse
// email index still indexes explicit nulls.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StudentDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mentor: Option<ObjectId>,
}

#[derive(Debug, Clone, Deserialize)]
struct SummaryDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct StudentLookupDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    mentor: Option<ObjectId>,
    #[serde(default)]
    mentor_docs: Vec<MentorDocument>,
}

impl From<MentorDocument> for Mentor {
    fn from(d: MentorDocument) -> Self {
        Self {
            id: d.id.into(),
            name: d.name,
        }
    }
}

impl From<StudentDocument> for Student {
    fn from(d: StudentDocument) -> Self {
        Self {
            id: d.id.into(),
            name: d.name,
            email: d.email,
            mentor: d.mentor.map(RecordId::from),
        }
    }
}

impl From<SummaryDocument> for Summary {
    fn from(d: SummaryDocument) -> Self {
        Self {
            id: d.id.into(),
            name: d.name,
        }
    }
}

/// Field named by a duplicate key message such as
/// `E11000 duplicate key error collection: db.students index: email_1 dup key: { email: "a@b" }`.
/// Older servers print `dup key: { : "a@b" }` or `index: db.students.$email_1`;
/// the field then comes from the index name.
fn duplicate_key_field(code: i32, message: &str) -> Option<String> {
    if code != DUPLICATE_KEY {
        return None;
    }

    let from_key = message
        .split_once("dup key: {")
        .and_then(|(_, rest)| rest.split_once(':'))
        .map(|(key, _)| key.trim())
        .filter(|key| !key.is_empty());
    let from_index = || {
        let (_, rest) = message.split_once("index: ")?;
        let name = rest.split_whitespace().next()?.rsplit('$').next()?;
        let (field, _) = name.rsplit_once('_')?;
        Some(field)
    };

    let field = from_key.or_else(from_index).unwrap_or_default();
    Some(field.to_string())
}

fn map_write_error(err: mongodb::error::Error) -> StoreError {
    let field = match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref we)) => {
            duplicate_key_field(we.code, &we.message)
        }
        _ => None,
    };

    match field {
        Some(field) => StoreError::Duplicate { field },
        None => StoreError::Mongo(err),
    }
}

#[derive(Debug, Clone)]
pub struct StoreMongo {
    mentors: Collection<MentorDocument>,
    students: Collection<StudentDocument>,
}

impl StoreMongo {
    pub async fn connect(url: &str, db_name: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(url).await?;
        let db = client.database(db_name);
        let store = Self {
            mentors: db.collection(MENTORS),
            students: db.collection(STUDENTS),
        };

        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).sparse(true).build())
            .build();
        store.students.create_index(index, None).await?;

        info!("Connected to database {}", db_name);
        Ok(store)
    }

    fn summary_options() -> FindOptions {
        FindOptions::builder()
            .projection(doc! { "_id": 1, "name": 1 })
            .build()
    }
}

#[async_trait]
impl Store for StoreMongo {
    async fn insert_mentor(&self, name: &str) -> StoreResult<Mentor> {
        let d = MentorDocument {
            id: ObjectId::new(),
            name: name.to_string(),
        };
        self.mentors
            .insert_one(&d, None)
            .await
            .map_err(map_write_error)?;
        debug!("{}: inserted {}", MENTORS, d.id);
        Ok(d.into())
    }

    async fn insert_student(&self, name: &str, email: Option<&str>) -> StoreResult<Student> {
        let d = StudentDocument {
            id: ObjectId::new(),
            name: name.to_string(),
            email: email.map(str::to_string),
            mentor: None,
        };
        self.students
            .insert_one(&d, None)
            .await
            .map_err(map_write_error)?;
        debug!("{}: inserted {}", STUDENTS, d.id);
        Ok(d.into())
    }

    async fn find_mentor(&self, id: RecordId) -> StoreResult<Option<Mentor>> {
        let found = self
            .mentors
            .find_one(doc! { "_id": id.oid() }, None)
            .await?;
        Ok(found.map(Mentor::from))
    }

    async fn find_student(&self, id: RecordId) -> StoreResult<Option<Student>> {
        let found = self
            .students
            .find_one(doc! { "_id": id.oid() }, None)
            .await?;
        Ok(found.map(Student::from))
    }

    async fn list_mentors(&self) -> StoreResult<Vec<Summary>> {
        let cursor = self
            .mentors
            .clone_with_type::<SummaryDocument>()
            .find(doc! {}, Self::summary_options())
            .await?;
        let docs: Vec<SummaryDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Summary::from).collect())
    }

    async fn list_students(&self) -> StoreResult<Vec<Summary>> {
        let cursor = self
            .students
            .clone_with_type::<SummaryDocument>()
            .find(doc! {}, Self::summary_options())
            .await?;
        let docs: Vec<SummaryDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Summary::from).collect())
    }

    async fn find_students_by_mentor(&self, mentor: RecordId) -> StoreResult<Vec<Student>> {
        let cursor = self
            .students
            .find(doc! { "mentor": mentor.oid() }, None)
            .await?;
        let docs: Vec<StudentDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Student::from).collect())
    }

    async fn set_mentor_many(&self, students: &[RecordId], mentor: RecordId) -> StoreResult<u64> {
        let ids: Vec<ObjectId> = students.iter().map(RecordId::oid).collect();
        let result = self
            .students
            .update_many(
                doc! { "_id": { "$in": ids } },
                doc! { "$set": { "mentor": mentor.oid() } },
                None,
            )
            .await
            .map_err(map_write_error)?;
        info!(
            "{}: matched {} modified {}",
            STUDENTS, result.matched_count, result.modified_count
        );
        Ok(result.modified_count)
    }

    async fn set_mentor(&self, student: RecordId, mentor: RecordId) -> StoreResult<()> {
        self.students
            .update_one(
                doc! { "_id": student.oid() },
                doc! { "$set": { "mentor": mentor.oid() } },
                None,
            )
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    async fn find_student_with_mentor(
        &self,
        id: RecordId,
    ) -> StoreResult<Option<(Student, Option<Mentor>)>> {
        let pipeline = vec![
            doc! { "$match": { "_id": id.oid() } },
            doc! {
                "$lookup": {
                    "from": MENTORS,
                    "localField": "mentor",
                    "foreignField": "_id",
                    "as": "mentor_docs",
                }
            },
        ];
        let mut cursor = self.students.aggregate(pipeline, None).await?;
        let found = match cursor.try_next().await? {
            Some(d) => from_document::<StudentLookupDocument>(d)?,
            None => return Ok(None),
        };

        let mentor = found.mentor_docs.into_iter().next().map(Mentor::from);
        let student = Student {
            id: found.id.into(),
            name: found.name,
            email: found.email,
            mentor: found.mentor.map(RecordId::from),
        };
        Ok(Some((student, mentor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_message_names_the_field() {
        let msg = "E11000 duplicate key error collection: mentor-student.students \
                   index: email_1 dup key: { email: \"a@x.org\" }";
        assert_eq!(duplicate_key_field(11000, msg), Some("email".to_string()));
    }

    #[test]
    fn unnamed_dup_key_falls_back_to_the_index_name() {
        let msg = "E11000 duplicate key error collection: mentor-student.students \
                   index: email_1 dup key: { : \"a@x.org\" }";
        assert_eq!(duplicate_key_field(11000, msg), Some("email".to_string()));

        let msg = "E11000 duplicate key error index: mentor-student.students.$email_1";
        assert_eq!(duplicate_key_field(11000, msg), Some("email".to_string()));
    }

    #[test]
    fn other_write_codes_are_not_duplicates() {
        assert_eq!(duplicate_key_field(121, "Document failed validation"), None);
    }

    #[test]
    fn unparsable_duplicate_message_still_counts() {
        assert_eq!(duplicate_key_field(11000, "E11000"), Some(String::new()));
    }

    #[test]
    fn unset_optionals_are_left_out_of_the_document() {
        let d = StudentDocument {
            id: ObjectId::new(),
            name: "Ada".to_string(),
            email: None,
            mentor: None,
        };
        let bson = mongodb::bson::to_document(&d).unwrap();
        assert!(bson.contains_key("_id"));
        assert!(!bson.contains_key("email"));
        assert!(!bson.contains_key("mentor"));
    }
}

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
use serde::{Deserialize, Serialize};

/// Listing projection of a mentor or a student: identifier and name only.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Summary {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
}

impl From<&Mentor> for Summary {
    fn from(mentor: &Mentor) -> Self {
        Self {
            id: mentor.id,
            name: mentor.name.clone(),
        }
    }
}

impl From<&Student> for Summary {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn student_summary_drops_email_and_mentor() {
        let mut student = Student::new("Ada", Some("ada@example.com"));
        student.mentor = Some(RecordId::new());

        let value = serde_json::to_value(Summary::from(&student)).unwrap();
        assert_eq!(value, json!({ "_id": student.id.to_hex(), "name": "Ada" }));
    }

    #[test]
    fn unassigned_student_omits_optional_fields() {
        let student = Student::new("Bob", None);
        let value = serde_json::to_value(&student).unwrap();
        assert_eq!(value, json!({ "_id": student.id.to_hex(), "name": "Bob" }));
    }
}

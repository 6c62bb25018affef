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
use crate::state::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which kind of record an identifier was meant to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Mentor,
    Student,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::Mentor => write!(f, "mentor"),
            IdKind::Student => write!(f, "student"),
        }
    }
}

/// What a not-found failure is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundSubject {
    Mentor,
    Student,
    /// Student exists but has no (resolvable) mentor.
    AssignedMentor,
    /// Bulk assignment changed no document.
    UpdatedStudents,
}

impl NotFoundSubject {
    pub fn label(&self) -> &'static str {
        match self {
            NotFoundSubject::Mentor | NotFoundSubject::AssignedMentor => "mentor",
            NotFoundSubject::Student => "student",
            NotFoundSubject::UpdatedStudents => "no students updated",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            NotFoundSubject::Mentor => "Mentor not found",
            NotFoundSubject::Student => "Student not found",
            NotFoundSubject::AssignedMentor => "No mentor assigned",
            NotFoundSubject::UpdatedStudents => "No students found to update",
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid {0} ID")]
    InvalidId(IdKind, String),

    /// Lists every malformed entry of the request, not only the first.
    #[error("Invalid {0} IDs: {ids}", ids = .1.join(", "))]
    InvalidIds(IdKind, Vec<String>),

    #[error("Email must be unique")]
    DuplicateEmail,

    #[error("{}", .0.message())]
    NotFound(NotFoundSubject),

    #[error("Internal Server Error")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { ref field } if field == "email" => ServiceError::DuplicateEmail,
            other => ServiceError::Storage(other),
        }
    }
}

/// The single error body shape of the API.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidId(..)
            | ServiceError::InvalidIds(..)
            | ServiceError::DuplicateEmail => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorEnvelope::new(self.to_string()))
    }
}

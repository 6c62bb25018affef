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
use crate::handler::web_response::{json_config, message};
use crate::server::error::ServiceError;
use crate::state::state::State;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct NewMentor {
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize, Debug)]
pub struct NewStudent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AssignStudents {
    #[serde(rename = "studentIds")]
    pub student_ids: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChangeMentor {
    #[serde(rename = "mentorId")]
    pub mentor_id: String,
}

pub async fn mentor_create(
    data: web::Data<State>,
    body: web::Json<NewMentor>,
) -> Result<HttpResponse, ServiceError> {
    let mentor = data.relationships.create_mentor(&body.name).await?;
    Ok(HttpResponse::Created().json(mentor))
}

pub async fn mentor_list(data: web::Data<State>) -> Result<HttpResponse, ServiceError> {
    let mentors = data.relationships.list_mentors().await?;
    Ok(HttpResponse::Ok().json(mentors))
}

pub async fn mentor_assign_students(
    data: web::Data<State>,
    path: web::Path<String>,
    body: web::Json<AssignStudents>,
) -> Result<HttpResponse, ServiceError> {
    data.relationships
        .assign_students_to_mentor(&path, &body.student_ids)
        .await?;
    Ok(message("Students assigned to mentor successfully"))
}

pub async fn mentor_students(
    data: web::Data<State>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let students = data.relationships.get_students_for_mentor(&path).await?;
    Ok(HttpResponse::Ok().json(students))
}

pub async fn student_create(
    data: web::Data<State>,
    body: web::Json<NewStudent>,
) -> Result<HttpResponse, ServiceError> {
    let student = data
        .relationships
        .create_student(&body.name, body.email.as_deref())
        .await?;
    Ok(HttpResponse::Created().json(student))
}

pub async fn student_list(data: web::Data<State>) -> Result<HttpResponse, ServiceError> {
    let students = data.relationships.list_students().await?;
    Ok(HttpResponse::Ok().json(students))
}

pub async fn student_change_mentor(
    data: web::Data<State>,
    path: web::Path<String>,
    body: web::Json<ChangeMentor>,
) -> Result<HttpResponse, ServiceError> {
    data.relationships
        .reassign_student_mentor(&path, &body.mentor_id)
        .await?;
    Ok(message("Mentor updated successfully"))
}

pub async fn student_mentor(
    data: web::Data<State>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let mentor = data.relationships.get_mentor_for_student(&path).await?;
    Ok(HttpResponse::Ok().json(mentor))
}

/// API route table.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::resource("/api/mentors")
                .route(web::post().to(mentor_create))
                .route(web::get().to(mentor_list)),
        )
        .service(
            web::resource("/api/mentors/{mentor_id}/students")
                .route(web::post().to(mentor_assign_students))
                .route(web::get().to(mentor_students)),
        )
        .service(
            web::resource("/api/students")
                .route(web::post().to(student_create))
                .route(web::get().to(student_list)),
        )
        .service(
            web::resource("/api/students/{student_id}/mentor")
                .route(web::put().to(student_change_mentor))
                .route(web::get().to(student_mentor)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::record_id::RecordId;
    use crate::handler::web::spa_index;
    use crate::state::store_local::StoreLocal;
    use actix_web::http::header::ContentType;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(State::new(Arc::new(StoreLocal::new()), None)))
                    .configure(configure)
                    .default_service(web::to(spa_index)),
            )
            .await
        };
    }

    macro_rules! send {
        ($app:expr, $req:expr) => {{
            let resp = test::call_service(&$app, $req.to_request()).await;
            let status: StatusCode = resp.status();
            let body = test::read_body(resp).await;
            let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            (status, value)
        }};
    }

    macro_rules! create {
        ($app:expr, $uri:expr, $body:expr) => {{
            let req = test::TestRequest::post().uri($uri).set_json($body);
            let (status, value) = send!($app, req);
            assert_eq!(status, StatusCode::CREATED);
            value["_id"].as_str().unwrap().to_string()
        }};
    }

    #[actix_web::test]
    async fn create_and_list_mentors() {
        let app = app!();
        let id = create!(app, "/api/mentors", json!({ "name": "A" }));

        let (status, value) = send!(app, test::TestRequest::get().uri("/api/mentors"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!([{ "_id": id, "name": "A" }]));
    }

    #[actix_web::test]
    async fn student_listing_hides_email() {
        let app = app!();
        let body = json!({ "name": "S", "email": "s@x.org" });
        let id = create!(app, "/api/students", body);

        let (_, value) = send!(app, test::TestRequest::get().uri("/api/students"));
        assert_eq!(value, json!([{ "_id": id, "name": "S" }]));
    }

    #[actix_web::test]
    async fn duplicate_email_uses_the_error_envelope() {
        let app = app!();
        let body = json!({ "name": "S", "email": "s@x.org" });
        create!(app, "/api/students", body.clone());

        let req = test::TestRequest::post().uri("/api/students").set_json(body);
        let (status, value) = send!(app, req);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({ "error": "Email must be unique" }));
    }

    #[actix_web::test]
    async fn assign_reassign_and_look_up() {
        let app = app!();
        let first = create!(app, "/api/mentors", json!({ "name": "First" }));
        let second = create!(app, "/api/mentors", json!({ "name": "Second" }));
        let student = create!(app, "/api/students", json!({ "name": "S" }));

        let req = test::TestRequest::post()
            .uri(&format!("/api/mentors/{}/students", first))
            .set_json(json!({ "studentIds": [student] }));
        let (status, value) = send!(app, req);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            value,
            json!({ "message": "Students assigned to mentor successfully" })
        );

        let mentor_uri = format!("/api/students/{}/mentor", student);
        let (status, value) = send!(app, test::TestRequest::get().uri(&mentor_uri));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({ "_id": first, "name": "First" }));

        let req = test::TestRequest::put()
            .uri(&mentor_uri)
            .set_json(json!({ "mentorId": second }));
        let (status, value) = send!(app, req);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({ "message": "Mentor updated successfully" }));

        let (_, value) = send!(app, test::TestRequest::get().uri(&mentor_uri));
        assert_eq!(value["_id"], json!(second));

        let uri = format!("/api/mentors/{}/students", second);
        let (status, value) = send!(app, test::TestRequest::get().uri(&uri));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            value,
            json!([{ "_id": student, "name": "S", "mentor": second }])
        );
    }

    #[actix_web::test]
    async fn invalid_ids_are_bad_requests() {
        let app = app!();
        let mentor = create!(app, "/api/mentors", json!({ "name": "M" }));

        let req = test::TestRequest::post()
            .uri(&format!("/api/mentors/{}/students", mentor))
            .set_json(json!({ "studentIds": ["x", RecordId::new().to_hex(), "y"] }));
        let (status, value) = send!(app, req);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({ "error": "Invalid student IDs: x, y" }));

        let req = test::TestRequest::post()
            .uri("/api/mentors/123/students")
            .set_json(json!({ "studentIds": ["also-bad"] }));
        let (status, value) = send!(app, req);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({ "error": "Invalid mentor ID" }));

        let (status, value) = send!(app, test::TestRequest::get().uri("/api/students/123/mentor"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({ "error": "Invalid student ID" }));

        let (status, value) = send!(app, test::TestRequest::get().uri("/api/mentors/123/students"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({ "error": "Invalid mentor ID" }));

        let req = test::TestRequest::put()
            .uri(&format!("/api/students/{}/mentor", RecordId::new()))
            .set_json(json!({ "mentorId": "zz" }));
        let (status, value) = send!(app, req);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value, json!({ "error": "Invalid mentor ID" }));
    }

    #[actix_web::test]
    async fn not_found_cases_are_distinguished() {
        let app = app!();
        let unknown = RecordId::new().to_hex();
        let mentor = create!(app, "/api/mentors", json!({ "name": "M" }));
        let student = create!(app, "/api/students", json!({ "name": "S" }));

        let req = test::TestRequest::post()
            .uri(&format!("/api/mentors/{}/students", unknown))
            .set_json(json!({ "studentIds": [student] }));
        let (status, value) = send!(app, req);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value, json!({ "error": "Mentor not found" }));

        let req = test::TestRequest::post()
            .uri(&format!("/api/mentors/{}/students", mentor))
            .set_json(json!({ "studentIds": [] }));
        let (status, value) = send!(app, req);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value, json!({ "error": "No students found to update" }));

        let uri = format!("/api/students/{}/mentor", student);
        let (status, value) = send!(app, test::TestRequest::get().uri(&uri));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value, json!({ "error": "No mentor assigned" }));

        let req = test::TestRequest::put()
            .uri(&format!("/api/students/{}/mentor", unknown))
            .set_json(json!({ "mentorId": mentor }));
        let (status, value) = send!(app, req);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value, json!({ "error": "Student not found" }));
    }

    #[actix_web::test]
    async fn mentor_without_students_is_an_empty_list() {
        let app = app!();
        let mentor = create!(app, "/api/mentors", json!({ "name": "M" }));

        let uri = format!("/api/mentors/{}/students", mentor);
        let (status, value) = send!(app, test::TestRequest::get().uri(&uri));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!([]));
    }

    #[actix_web::test]
    async fn malformed_bodies_use_the_error_envelope() {
        let app = app!();
        let mentor = create!(app, "/api/mentors", json!({ "name": "M" }));

        let req = test::TestRequest::post()
            .uri(&format!("/api/mentors/{}/students", mentor))
            .insert_header(ContentType::json())
            .set_payload("{\"studentIds\":");
        let (status, value) = send!(app, req);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["error"].is_string());

        let req = test::TestRequest::put()
            .uri(&format!("/api/students/{}/mentor", RecordId::new()))
            .set_json(json!({}));
        let (status, value) = send!(app, req);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["error"].is_string());
    }

    #[actix_web::test]
    async fn unknown_paths_without_frontend_are_not_found() {
        let app = app!();
        let (status, value) = send!(app, test::TestRequest::get().uri("/some/page"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value, json!({ "error": "Not found" }));
    }
}

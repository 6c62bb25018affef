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
use crate::handler::web_response::not_found;
use crate::state::state::State;
use actix_files::{Files, NamedFile};
use actix_web::http::Method;
use actix_web::{web, HttpRequest, HttpResponse};
use log::debug;
use std::path::Path;

/// Static assets of the frontend, mounted below the API routes.
pub fn frontend_files(dir: &Path) -> Files {
    Files::new("/", dir)
        .index_file("index.html")
        .default_handler(web::to(spa_index))
}

/// Anything the API and the asset directory don't know is left to the
/// client-side router.
pub async fn spa_index(
    data: web::Data<State>,
    req: HttpRequest,
) -> actix_web::Result<HttpResponse> {
    let dir = match data.static_dir {
        Some(ref dir) if *req.method() == Method::GET => dir,
        _ => return Ok(not_found()),
    };

    debug!("Serving frontend for {}", req.path());
    let file = NamedFile::open_async(dir.join("index.html")).await?;
    Ok(file.into_response(&req))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::route::configure;
    use crate::state::store_local::StoreLocal;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use std::fs;
    use std::sync::Arc;

    #[actix_web::test]
    async fn frontend_serves_assets_and_falls_back_to_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "INDEX").unwrap();
        fs::write(dir.path().join("app.js"), "JS").unwrap();

        let state = State::new(Arc::new(StoreLocal::new()), Some(dir.path().to_path_buf()));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure)
                .service(frontend_files(dir.path())),
        )
        .await;

        for (uri, body) in [("/", "INDEX"), ("/app.js", "JS"), ("/students/list", "INDEX")] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "GET {}", uri);
            assert_eq!(test::read_body(resp).await, body.as_bytes(), "GET {}", uri);
        }

        let req = test::TestRequest::get().uri("/api/mentors").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "[]".as_bytes());
    }
}

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
mod args;
mod data_model;
mod handler;
mod server;
mod state;

use crate::args::Args;
use crate::handler::route::configure;
use crate::handler::web::{frontend_files, spa_index};
use crate::state::state::State;
use crate::state::store::Store;
use crate::state::store_local::StoreLocal;
use crate::state::store_mongo::StoreMongo;
use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::{error, info, warn};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

async fn open_store(args: &Args) -> io::Result<Arc<dyn Store>> {
    if args.in_memory {
        return Ok(Arc::new(StoreLocal::new()));
    }

    match StoreMongo::connect(&args.db_url, &args.db_name).await {
        Ok(store) => Ok(Arc::new(store)),
        Err(e) => {
            error!("Database connection error: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, e))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();

    env_logger::init();

    let store = open_store(&args).await?;

    let static_dir = PathBuf::from(&args.static_dir);
    let static_dir = if static_dir.is_dir() {
        info!("Serving frontend from {}", static_dir.display());
        Some(static_dir)
    } else {
        warn!("Frontend directory {} not found", static_dir.display());
        None
    };

    let data = Data::new(State::new(store, static_dir.clone()));
    info!("Server is running on port {}", args.port);
    HttpServer::new(move || {
        let app = App::new()
            .app_data(data.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(configure);

        match static_dir {
            Some(ref dir) => app.service(frontend_files(dir)),
            None => app.default_service(web::to(spa_index)),
        }
    })
    .bind((args.bind.as_str(), args.port))?
    .run()
    .await
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// LabelVision print broker.
//
// Entry point. Loads configuration, initialises logging, selects the OS print
// subsystem once, and serves the HTTP API plus the web bundle.

mod error;
mod handlers;
mod logging;
mod payload;
mod routes;
mod services;
mod state;

use actix_web::{App, HttpServer, middleware, web};
use labelvision_core::AppConfig;
use labelvision_core::config::config_path;
use tracing::info;

use handlers::static_files;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let env = |key: &str| std::env::var(key).ok();

    let path = config_path(env);
    let mut config = AppConfig::load(&path);
    config.apply_overrides(env);
    logging::init(&config.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %path.display(),
        "LabelVision print broker starting"
    );

    let backend = labelvision_print::select_backend();
    let state = web::Data::new(AppState::new(backend, &config));
    state.log_startup_warnings();

    let json_limit = config.max_payload_bytes;
    let bind_addr = config.bind_addr();

    let server = HttpServer::new({
        let state = state.clone();
        move || {
            App::new()
                .wrap(middleware::Logger::default())
                .app_data(state.clone())
                .app_data(routes::json_config(json_limit))
                .configure(routes::configure)
                .default_service(web::to(static_files::serve))
        }
    })
    .bind(&bind_addr)?
    .run();

    state.register_server(server.handle());
    info!(addr = %bind_addr, "serving at http://{bind_addr}");

    server.await?;
    info!("LabelVision print broker stopped");
    Ok(())
}

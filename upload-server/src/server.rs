use std::sync::Arc;

use actix_easy_multipart::text::TextConfig;
use actix_easy_multipart::MultipartFormConfig;
use actix_files::Files;
use actix_web::web;
use colored::Colorize;
use infrastructure_common::config::build_config;
use infrastructure_common::telemetry::initialize_telemetry;
use tracing::{error, info};

use crate::api;
use crate::infrastructure::{ServiceProvider, UploadServerConfig};

pub fn run() {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(x) => x,
        Err(e) => {
            return eprintln!("{}: {}", "Cannot build runtime".red(), e);
        }
    };
    runtime.block_on(async_run());
}

pub async fn async_run() {
    let config = match build_config().and_then(|c| Ok(c.try_deserialize::<UploadServerConfig>()?)) {
        Ok(x) => x,
        Err(e) => {
            return eprintln!("{}: {}", "Cannot build config".red(), e);
        }
    };
    if let Err(e) = initialize_telemetry(config.common.telemetry()) {
        return eprintln!("{}: {}", "Cannot build logger".red(), e);
    };
    let service_provider = match ServiceProvider::build(config) {
        Ok(x) => Arc::new(x),
        Err(e) => {
            return eprintln!("{}: {:#}", "Cannot build Service Provider".red(), e);
        }
    };
    tokio::select! {
        _ = initialize_web_host(service_provider) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Stopping services (ctrl-c handling).");
        }
    }
}

/// The route table: chunk uploads on `/upload`, static assets on everything else.
pub fn routes(sp: Arc<ServiceProvider>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let upload = &sp.config().upload;
        cfg.app_data(
            MultipartFormConfig::default()
                .total_limit(upload.total_limit)
                .memory_limit(upload.memory_limit),
        )
        // The resumable fields are plain strings whatever content type the client gives them.
        .app_data(TextConfig::default().validate_content_type(false))
        .app_data(web::Data::from(sp.clone()))
        .service(
            web::resource("/upload")
                .route(web::post().to(api::upload::upload_chunk))
                .default_service(web::to(api::upload::method_not_allowed)),
        );
        let statics = &sp.config().static_files;
        if statics.enable {
            cfg.service(
                Files::new("/", statics.path.as_str()).index_file(statics.index_file.as_str()),
            );
        }
    }
}

pub async fn initialize_web_host(sp: Arc<ServiceProvider>) {
    let host = sp.config().common.host().clone();
    let mut server = actix_web::HttpServer::new(move || {
        actix_web::App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(routes(sp.clone()))
    });
    if let Some(workers) = host.workers() {
        server = server.workers(*workers);
    }
    let server = match server.bind((host.bind_address().to_owned(), *host.bind_port())) {
        Ok(x) => x,
        Err(e) => {
            return error!(
                "Cannot bind {}:{}: {}",
                host.bind_address(),
                host.bind_port(),
                e
            );
        }
    };
    info!("Listening on {}:{}.", host.bind_address(), host.bind_port());
    match server.disable_signals().run().await {
        Ok(_) => info!("Web server stopped successfully."),
        Err(e) => error!("Web server into error: {}", e),
    }
}

//! Thin HTTP host for a [`Dispatcher`].
//!
//! The transport stays deliberately dumb: it parses the JSON-RPC envelope,
//! hands it to the dispatcher, and returns whatever envelope comes back.
//! RPC-level failures ride inside the envelope, so the HTTP status is 200
//! either way; only malformed payloads get a 4xx from the framework.

use crate::rpc::Request;
use crate::runtime::Dispatcher;
use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use log::info;
use serde_json::json;
use std::sync::Arc;

/// Shared state for the HTTP routes.
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

pub async fn handle_rpc(request: web::Json<Request>, state: web::Data<AppState>) -> impl Responder {
    let response = state.dispatcher.dispatch(request.into_inner()).await;
    HttpResponse::Ok().json(response)
}

pub async fn system_status() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

/// Binds and runs the HTTP host until shutdown.
pub async fn run_server(dispatcher: Arc<Dispatcher>, bind_address: &str) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState { dispatcher });

    info!("Starting HTTP server on {}", bind_address);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new().wrap(cors).app_data(app_state.clone()).service(
            web::scope("/api")
                .route("/rpc", web::post().to(handle_rpc))
                .route("/system/status", web::get().to(system_status)),
        )
    })
    .bind(bind_address)?
    .run()
    .await
}

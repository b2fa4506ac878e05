//! HTTP/WebSocket shell for the game session.
//!
//! One route matters: `/enter` upgrades to a WebSocket and bridges the
//! connection into the single room. Everything the client can do happens
//! over that socket; HTTP itself only serves the health probe.
//!
//! ## Submodules
//!
//! - [`hall`] — Session lifecycle and WebSocket bridging
//! - [`handlers`] — actix-web route handlers

pub mod hall;
pub mod handlers;

pub use hall::Hall;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;

pub async fn run() -> Result<(), std::io::Error> {
    let hall = web::Data::new(Hall::default());
    log::info!("starting game server");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(hall.clone())
            .route("/health", web::get().to(handlers::health))
            .route("/enter", web::get().to(handlers::enter))
    })
    .workers(4)
    .bind(std::env::var("BIND_ADDR").expect("BIND_ADDR must be set"))?
    .run()
    .await
}

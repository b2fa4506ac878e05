use super::*;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;

pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

/// WebSocket entry point shared by the administrator console and players.
pub async fn enter(
    hall: web::Data<Hall>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => match hall.bridge(session, stream).await {
            Ok(()) => response.map_into_left_body(),
            Err(e) => HttpResponse::ServiceUnavailable()
                .body(e.to_string())
                .map_into_right_body(),
        },
        Err(e) => HttpResponse::InternalServerError()
            .body(e.to_string())
            .map_into_right_body(),
    }
}

use actix_web::{HttpRequest, HttpResponse};

/// Fallback for requests no route matched.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    log::debug!("No route for {} {}", req.method(), req.path());
    HttpResponse::NotFound()
        .content_type("text/plain; charset=utf-8")
        .body("Route does not exist")
}

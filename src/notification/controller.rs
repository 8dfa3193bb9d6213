use actix::Addr;
use actix_web::{HttpRequest, HttpResponse, web};
use actix_web_actors::ws;

use crate::notification::hub::NotificationHub;
use crate::notification::session::NotificationSession;

/// WebSocket subscription for new-post events
/// GET /ws
pub async fn subscribe(
    req: HttpRequest,
    stream: web::Payload,
    hub: web::Data<Addr<NotificationHub>>,
) -> Result<HttpResponse, actix_web::Error> {
    log::info!(
        "WebSocket subscription request from {}",
        req.connection_info().realip_remote_addr().unwrap_or("unknown")
    );

    let session = NotificationSession::new(hub.get_ref().clone());
    ws::start(session, &req, stream)
}

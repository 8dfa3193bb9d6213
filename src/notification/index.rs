use super::controller::subscribe;
use actix_web::web;

pub fn notification_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(subscribe));
}

use super::controller::serve_asset;
use crate::uploader::service::ASSETS_PREFIX;
use actix_web::web;

pub fn asset_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope(ASSETS_PREFIX).route("/{path:.*}", web::get().to(serve_asset)));
}

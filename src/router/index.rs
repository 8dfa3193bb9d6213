use crate::assets::index::asset_routes;
use crate::notification::index::notification_routes;
use crate::post::post_index::post_routes;
use crate::utils::error::CustomError;
use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        CustomError::ValidationError(format!("Invalid JSON body: {}", err)).into()
    }));
    cfg.configure(post_routes);
    cfg.configure(notification_routes);
    cfg.configure(asset_routes);
}

use super::post_controller::{
    add_comment, create_post, create_post_with_uploads, delete_post, get_post, list_posts,
    update_post,
};
use actix_web::{guard, http::header, web};

fn is_multipart(ctx: &guard::GuardContext) -> bool {
    ctx.head()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .route("", web::get().to(list_posts))
            .route(
                "",
                web::post()
                    .guard(guard::fn_guard(is_multipart))
                    .to(create_post_with_uploads),
            )
            .route("", web::post().to(create_post))
            .route("/{id}", web::get().to(get_post))
            .route("/{id}", web::put().to(update_post))
            .route("/{id}", web::delete().to(delete_post))
            .route("/{id}/comments", web::post().to(add_comment)),
    );
}

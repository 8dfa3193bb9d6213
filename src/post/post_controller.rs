use crate::notification::hub::{BroadcastNewPost, NotificationHub};
use crate::post::post_model::{CreateCommentRequest, CreatePostRequest, Post, PostPatch};
use crate::post::post_service::PostService;
use crate::uploader::form::read_post_form;
use crate::uploader::model::UploadField;
use crate::uploader::service::{StoredFile, UploadService};
use crate::utils::error::CustomError;
use actix::Addr;
use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};

/// `<scheme>://<host>` of the incoming request, used to absolutize asset paths.
fn asset_base(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

fn parse_id(raw: &str) -> Result<u64, CustomError> {
    raw.parse()
        .map_err(|_| CustomError::ValidationError(format!("Invalid post id '{}'", raw)))
}

/// List every post
/// GET /posts
pub async fn list_posts(
    req: HttpRequest,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let base = asset_base(&req);
    let posts: Vec<Post> = post_service
        .list()
        .await?
        .into_iter()
        .map(|post| post.with_asset_base(&base))
        .collect();

    Ok(HttpResponse::Ok().json(posts))
}

/// GET /posts/{id}
pub async fn get_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_id(&post_id)?;
    let post = post_service.get(id).await?;

    Ok(HttpResponse::Ok().json(post.with_asset_base(&asset_base(&req))))
}

/// Create a post from a JSON body
/// POST /posts
pub async fn create_post(
    req: HttpRequest,
    body: web::Json<CreatePostRequest>,
    post_service: web::Data<PostService>,
    hub: web::Data<Addr<NotificationHub>>,
) -> Result<HttpResponse, CustomError> {
    let created = post_service.create(body.into_inner()).await?;
    log::info!("Created post {}", created.id);

    Ok(respond_created(&req, created, &hub))
}

/// Create a post from a multipart form carrying both images
/// POST /posts (multipart/form-data)
pub async fn create_post_with_uploads(
    req: HttpRequest,
    payload: Multipart,
    post_service: web::Data<PostService>,
    upload_service: web::Data<UploadService>,
    hub: web::Data<Addr<NotificationHub>>,
) -> Result<HttpResponse, CustomError> {
    let form = read_post_form(payload, upload_service.validator().max_file_size).await?;

    let missing = form.missing_files();
    if !missing.is_empty() {
        log::warn!("Rejected post upload, missing: {}", missing.join(", "));
        return Err(CustomError::ValidationError(
            "Both images are required".to_string(),
        ));
    }

    let mut stored: Vec<StoredFile> = Vec::with_capacity(form.files.len());
    for (field, file) in &form.files {
        match upload_service.save(*field, file).await {
            Ok(saved) => stored.push(saved),
            Err(e) => {
                log::warn!("Failed to store {} upload: {}", field.field_name(), e);
                upload_service.discard(&stored).await;
                return Err(e.into());
            }
        }
    }

    let mut request = form.request;
    for file in &stored {
        match file.field {
            UploadField::Image => request.image_url = Some(file.public_path.clone()),
            UploadField::Background => request.background_img = Some(file.public_path.clone()),
        }
    }

    let created = match post_service.create(request).await {
        Ok(post) => post,
        Err(e) => {
            upload_service.discard(&stored).await;
            return Err(e.into());
        }
    };
    log::info!("Created post {} with uploaded images", created.id);

    Ok(respond_created(&req, created, &hub))
}

// The broadcast is queued only once the response is built; the hub delivers
// it from its own mailbox so subscribers never hold up the request.
fn respond_created(req: &HttpRequest, created: Post, hub: &Addr<NotificationHub>) -> HttpResponse {
    let response = HttpResponse::Created().json(created.clone().with_asset_base(&asset_base(req)));
    hub.do_send(BroadcastNewPost { post: created });
    response
}

/// PUT /posts/{id}
pub async fn update_post(
    post_id: web::Path<String>,
    body: web::Json<PostPatch>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_id(&post_id)?;
    post_service.update(id, body.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Idempotent: deleting an unknown post still answers 204.
/// DELETE /posts/{id}
pub async fn delete_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_id(&post_id)?;
    if post_service.delete(id).await? {
        log::info!("Deleted post {}", id);
    }

    Ok(HttpResponse::NoContent().finish())
}

/// POST /posts/{id}/comments
pub async fn add_comment(
    post_id: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let id = parse_id(&post_id)?;
    let CreateCommentRequest { user, text } = body.into_inner();

    let (user, text) = match (
        user.filter(|u| !u.trim().is_empty()),
        text.filter(|t| !t.trim().is_empty()),
    ) {
        (Some(user), Some(text)) => (user, text),
        _ => {
            return Err(CustomError::ValidationError(
                "User and text are required".to_string(),
            ));
        }
    };

    let comment = post_service.add_comment(id, user, text).await?;

    Ok(HttpResponse::Ok().json(comment))
}

use crate::uploader::service::UploadService;
use crate::utils::error::CustomError;
use actix_web::{HttpResponse, web};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Resolves a request tail inside `root`, refusing anything that could escape it.
fn resolve(root: &Path, tail: &str) -> Option<PathBuf> {
    let relative = Path::new(tail);
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if resolved == root {
        return None;
    }
    Some(resolved)
}

/// Serve an uploaded file
/// GET /assets/{path}
pub async fn serve_asset(
    tail: web::Path<String>,
    upload_service: web::Data<UploadService>,
) -> Result<HttpResponse, CustomError> {
    let not_found = || CustomError::NotFoundError("Asset not found".to_string());

    let path = resolve(upload_service.assets_dir(), &tail).ok_or_else(not_found)?;

    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
            return Err(not_found());
        }
        Err(e) => {
            log::error!("Failed to read asset {}: {}", path.display(), e);
            return Err(CustomError::InternalServerError(
                "Internal Server Error".to_string(),
            ));
        }
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok(HttpResponse::Ok().content_type(mime.as_ref()).body(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_stays_inside_root() {
        let root = Path::new("/srv/assets");
        assert_eq!(
            resolve(root, "faces/a.png"),
            Some(PathBuf::from("/srv/assets/faces/a.png"))
        );
        assert_eq!(resolve(root, "../secret"), None);
        assert_eq!(resolve(root, "faces/../../secret"), None);
        assert_eq!(resolve(root, "/etc/passwd"), None);
        assert_eq!(resolve(root, ""), None);
    }
}

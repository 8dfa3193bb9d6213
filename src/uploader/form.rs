use actix_multipart::Multipart;
use futures_util::StreamExt;

use crate::post::post_model::{Author, CreatePostRequest};
use crate::uploader::model::{FileUpload, UploadField};
use crate::utils::error::CustomError;

/// A multipart post submission: text fields plus at most one file per image field.
#[derive(Debug, Default)]
pub struct PostForm {
    pub request: CreatePostRequest,
    pub files: Vec<(UploadField, FileUpload)>,
}

impl PostForm {
    pub fn file(&self, field: UploadField) -> Option<&FileUpload> {
        self.files
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, file)| file)
    }

    pub fn missing_files(&self) -> Vec<&'static str> {
        UploadField::ALL
            .iter()
            .filter(|field| self.file(**field).is_none())
            .map(|field| field.field_name())
            .collect()
    }
}

/// Reads the whole multipart body. Files larger than `max_file_size` abort the read.
pub async fn read_post_form(
    mut payload: Multipart,
    max_file_size: usize,
) -> Result<PostForm, CustomError> {
    let mut form = PostForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            CustomError::ValidationError(format!("Error reading multipart field: {}", e))
        })?;

        let content_disposition = match field.content_disposition() {
            Some(cd) => cd.clone(),
            None => continue,
        };
        let field_name = content_disposition.get_name().unwrap_or("").to_string();

        if let Some(upload_field) = UploadField::from_field_name(&field_name) {
            if content_disposition.get_filename().is_none() {
                // A text value under an image field name references an existing asset.
                let value = read_text(&mut field, &field_name).await?;
                set_text_field(&mut form.request, &field_name, value)?;
                continue;
            }

            if form.file(upload_field).is_some() {
                return Err(CustomError::ValidationError(format!(
                    "Only one file is allowed for field '{}'",
                    field_name
                )));
            }

            let file_name = content_disposition
                .get_filename()
                .map(|f| f.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let content_type = field.content_type().map(|ct| ct.to_string());

            let mut data = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| {
                    CustomError::ValidationError(format!("Error reading file chunk: {}", e))
                })?;
                if data.len() + chunk.len() > max_file_size {
                    return Err(CustomError::ValidationError(format!(
                        "File too large. Maximum size: {} bytes",
                        max_file_size
                    )));
                }
                data.extend_from_slice(&chunk);
            }

            form.files
                .push((upload_field, FileUpload::new(file_name, data, content_type)));
        } else {
            let value = read_text(&mut field, &field_name).await?;
            set_text_field(&mut form.request, &field_name, value)?;
        }
    }

    Ok(form)
}

async fn read_text(
    field: &mut actix_multipart::Field,
    field_name: &str,
) -> Result<String, CustomError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| {
            CustomError::ValidationError(format!("Error reading field '{}': {}", field_name, e))
        })?;
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes).map_err(|_| {
        CustomError::ValidationError(format!("Field '{}' is not valid UTF-8", field_name))
    })
}

fn set_text_field(
    request: &mut CreatePostRequest,
    name: &str,
    value: String,
) -> Result<(), CustomError> {
    match name {
        "id" => {
            let id = value.trim().parse().map_err(|_| {
                CustomError::ValidationError(format!("Invalid post id '{}'", value))
            })?;
            request.id = Some(id);
        }
        "title" => request.title = Some(value),
        "description" => request.description = Some(value),
        "content" => request.content = Some(value),
        "author" => request.author = Some(Author::from_form_value(&value)),
        "imageURL" => request.image_url = Some(value),
        "backgroundimg" => request.background_img = Some(value),
        "" | "comments" => log::debug!("Ignoring form field '{}'", name),
        _ => {
            request
                .extra
                .insert(name.to_string(), serde_json::Value::String(value));
        }
    }
    Ok(())
}

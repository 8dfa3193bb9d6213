/// The two image slots a post can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    /// Author face, multipart field `imageURL`.
    Image,
    /// Header background, multipart field `backgroundimg`.
    Background,
}

impl UploadField {
    pub const ALL: [UploadField; 2] = [UploadField::Image, UploadField::Background];

    pub fn from_field_name(name: &str) -> Option<Self> {
        match name {
            "imageURL" => Some(UploadField::Image),
            "backgroundimg" => Some(UploadField::Background),
            _ => None,
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            UploadField::Image => "imageURL",
            UploadField::Background => "backgroundimg",
        }
    }

    /// Sub-directory of the assets root where files for this field land.
    pub fn sub_dir(&self) -> Option<&'static str> {
        match self {
            UploadField::Image => Some("faces"),
            UploadField::Background => None,
        }
    }
}

/// Represents an uploaded file held in memory
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: String, data: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            file_name,
            data,
            content_type,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.rsplit_once('.')?;
        Some(ext.to_lowercase())
    }

    /// Original name reduced to a safe single path component.
    pub fn sanitized_name(&self) -> String {
        let base = self
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default();
        let cleaned: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let cleaned = cleaned.trim_start_matches('.');
        if cleaned.is_empty() {
            "upload".to_string()
        } else {
            cleaned.to_string()
        }
    }
}

/// File validation configuration
#[derive(Debug, Clone)]
pub struct FileValidator {
    /// Allowed file extensions (e.g., ["jpg", "png", "gif"])
    pub allowed_extensions: Vec<String>,
    /// Maximum file size in bytes
    pub max_file_size: usize,
}

impl FileValidator {
    /// Images only, max 10MB
    pub fn images() -> Self {
        Self {
            allowed_extensions: ["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_size: 10 * 1024 * 1024,
        }
    }

    pub fn with_max_size(mut self, size_bytes: usize) -> Self {
        self.max_file_size = size_bytes;
        self
    }

    pub fn validate(&self, file: &FileUpload) -> Result<(), String> {
        let extension = file.extension().ok_or("File has no extension")?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(format!(
                "Invalid file type '{}'. Allowed types: {}",
                extension,
                self.allowed_extensions.join(", ")
            ));
        }

        if file.size() > self.max_file_size {
            return Err(format!(
                "File too large. Maximum size: {} bytes, file size: {} bytes",
                self.max_file_size,
                file.size()
            ));
        }

        if file.data.is_empty() {
            return Err("File is empty".to_string());
        }

        Ok(())
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::images()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, len: usize) -> FileUpload {
        FileUpload::new(name.to_string(), vec![1; len], None)
    }

    #[test]
    fn validator_checks_extension_and_size() {
        let validator = FileValidator::images().with_max_size(8);

        assert!(validator.validate(&file("face.PNG", 4)).is_ok());
        assert!(validator.validate(&file("notes.txt", 4)).is_err());
        assert!(validator.validate(&file("noext", 4)).is_err());
        assert!(validator.validate(&file("big.jpg", 9)).is_err());
        assert!(validator.validate(&file("empty.jpg", 0)).is_err());
    }

    #[test]
    fn sanitized_name_strips_directories() {
        assert_eq!(file("../../etc/passwd.png", 1).sanitized_name(), "passwd.png");
        assert_eq!(file("C:\\pics\\my face.jpg", 1).sanitized_name(), "my_face.jpg");
        assert_eq!(file("..", 1).sanitized_name(), "upload");
    }

    #[test]
    fn field_names_round_trip() {
        for field in UploadField::ALL {
            assert_eq!(UploadField::from_field_name(field.field_name()), Some(field));
        }
        assert_eq!(UploadField::from_field_name("title"), None);
    }
}

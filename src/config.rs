use std::env;
use std::path::PathBuf;

/// Server settings read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// JSON document holding every post.
    pub posts_file: PathBuf,
    /// Root directory for uploaded images, served under `/assets`.
    pub assets_dir: PathBuf,
    pub max_upload_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            posts_file: PathBuf::from("./storage/blogPosts.json"),
            assets_dir: PathBuf::from("assets"),
            max_upload_size: 10 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(port) => port
                .parse()
                .map_err(|_| format!("PORT must be a port number, got '{}'", port))?,
            Err(_) => defaults.port,
        };

        let max_upload_size = match env::var("MAX_UPLOAD_SIZE_MB") {
            Ok(mb) => {
                let parsed: usize = mb
                    .parse()
                    .map_err(|_| format!("MAX_UPLOAD_SIZE_MB must be a number, got '{}'", mb))?;
                megabytes_to_bytes(parsed)
                    .ok_or_else(|| format!("MAX_UPLOAD_SIZE_MB is too large, got '{}'", mb))?
            }
            Err(_) => defaults.max_upload_size,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            posts_file: env::var("POSTS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.posts_file),
            assets_dir: env::var("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_dir),
            max_upload_size,
        })
    }
}

fn megabytes_to_bytes(mb: usize) -> Option<usize> {
    mb.checked_mul(1024 * 1024)
}

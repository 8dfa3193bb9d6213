use crate::post::post_model::{Comment, CreatePostRequest, Post, PostPatch};
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("post {0} not found")]
    NotFound(u64),

    #[error("post {0} already exists")]
    Conflict(u64),

    #[error("no post id left after {0}")]
    IdsExhausted(u64),

    #[error("posts document I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("posts document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Posts persisted as one JSON array on disk.
///
/// Every operation reads the whole document, changes an in-memory copy and
/// replaces the document. The lock serializes those cycles within the process.
pub struct PostService {
    path: PathBuf,
    lock: Mutex<()>,
}

impl PostService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PostService {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_posts().await
    }

    pub async fn get(&self, id: u64) -> Result<Post, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_posts()
            .await?
            .into_iter()
            .find(|post| post.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn create(&self, request: CreatePostRequest) -> Result<Post, StoreError> {
        let _guard = self.lock.lock().await;
        let mut posts = self.read_posts().await?;

        let id = match request.id {
            Some(id) if posts.iter().any(|post| post.id == id) => {
                return Err(StoreError::Conflict(id));
            }
            Some(id) => id,
            None => next_id(&posts)?,
        };

        let post = request.into_post(id);
        posts.push(post.clone());
        self.write_posts(&posts).await?;

        Ok(post)
    }

    pub async fn update(&self, id: u64, patch: PostPatch) -> Result<Post, StoreError> {
        let _guard = self.lock.lock().await;
        let mut posts = self.read_posts().await?;

        let post = posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(StoreError::NotFound(id))?;
        patch.apply_to(post);
        let updated = post.clone();

        self.write_posts(&posts).await?;
        Ok(updated)
    }

    /// Removes a post. Returns whether anything was removed; a missing id is
    /// not an error and leaves the document untouched.
    pub async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut posts = self.read_posts().await?;

        let before = posts.len();
        posts.retain(|post| post.id != id);
        if posts.len() == before {
            return Ok(false);
        }

        self.write_posts(&posts).await?;
        Ok(true)
    }

    pub async fn add_comment(
        &self,
        id: u64,
        user: String,
        text: String,
    ) -> Result<Comment, StoreError> {
        let _guard = self.lock.lock().await;
        let mut posts = self.read_posts().await?;

        let post = posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let comment = Comment {
            user,
            text,
            timestamp: Utc::now(),
        };
        post.comments.push(comment.clone());

        self.write_posts(&posts).await?;
        Ok(comment)
    }

    async fn read_posts(&self) -> Result<Vec<Post>, StoreError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            // First run: no document yet.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&data)?)
    }

    async fn write_posts(&self, posts: &[Post]) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(posts)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.tmp_path();
        let written = write_synced(&tmp_path, &data).await;
        let replaced = match written {
            Ok(()) => tokio::fs::rename(&tmp_path, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = replaced {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "posts.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

fn next_id(posts: &[Post]) -> Result<u64, StoreError> {
    match posts.iter().map(|post| post.id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted(max)),
    }
}

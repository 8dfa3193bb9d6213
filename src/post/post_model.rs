use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_TITLE: &str = "Default Title";
pub const DEFAULT_DESCRIPTION: &str = "Default Description";
pub const DEFAULT_CONTENT: &str = "Default Content";
pub const UNKNOWN_AUTHOR_NAME: &str = "Unknown";
pub const UNKNOWN_AUTHOR_EMAIL: &str = "unknown@example.com";

/// Keys clients can never set through the free-form part of a request.
const RESERVED_KEYS: [&str; 2] = ["id", "comments"];

/// A blog post as stored in the posts document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub content: String,
    pub author: Author,
    #[serde(rename = "imageURL", default)]
    pub image_url: Option<String>,
    #[serde(rename = "backgroundimg", default)]
    pub background_img: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Any other fields supplied at creation, kept as given.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authors are either a bare name or a profile with an optional email.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Author {
    Profile {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
    Name(String),
}

impl Default for Author {
    fn default() -> Self {
        Author::Profile {
            name: UNKNOWN_AUTHOR_NAME.to_string(),
            email: Some(UNKNOWN_AUTHOR_EMAIL.to_string()),
        }
    }
}

impl Author {
    /// Multipart forms carry the author as text: a JSON profile object or a plain name.
    pub fn from_form_value(value: &str) -> Self {
        match serde_json::from_str::<Author>(value) {
            Ok(author @ Author::Profile { .. }) => author,
            _ => Author::Name(value.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Comment {
    pub user: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Fields a client may supply when creating a post. Everything is optional.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CreatePostRequest {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: Option<Author>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    #[serde(rename = "backgroundimg")]
    pub background_img: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreatePostRequest {
    /// Builds the stored post, filling placeholders for missing or empty fields.
    pub fn into_post(self, id: u64) -> Post {
        Post {
            id,
            title: or_default(self.title, DEFAULT_TITLE),
            description: or_default(self.description, DEFAULT_DESCRIPTION),
            content: or_default(self.content, DEFAULT_CONTENT),
            author: self.author.unwrap_or_default(),
            image_url: self.image_url.filter(|s| !s.is_empty()),
            background_img: self.background_img.filter(|s| !s.is_empty()),
            comments: Vec::new(),
            extra: without_reserved(self.extra),
        }
    }
}

fn without_reserved(mut extra: Map<String, Value>) -> Map<String, Value> {
    for key in RESERVED_KEYS {
        extra.remove(key);
    }
    extra
}

fn or_default(value: Option<String>, placeholder: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

/// Partial update. Only keys present in the request body are applied.
///
/// Unknown keys overwrite the post's extra fields. `id` and `comments` are
/// not patchable and are ignored if sent.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PostPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: Option<Author>,
    #[serde(rename = "imageURL", default, deserialize_with = "deserialize_some")]
    pub image_url: Option<Option<String>>,
    #[serde(rename = "backgroundimg", default, deserialize_with = "deserialize_some")]
    pub background_img: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PostPatch {
    pub fn apply_to(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(description) = self.description {
            post.description = description;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(author) = self.author {
            post.author = author;
        }
        if let Some(image_url) = self.image_url {
            post.image_url = image_url;
        }
        if let Some(background_img) = self.background_img {
            post.background_img = background_img;
        }
        post.extra.extend(without_reserved(self.extra));
    }
}

// Distinguishes an explicit `null` (clear the field) from an absent key.
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub user: Option<String>,
    pub text: Option<String>,
}

impl Post {
    /// Rewrites relative asset paths into absolute URLs rooted at `base`
    /// (e.g. `http://localhost:5000`). Absolute URLs and nulls are left alone.
    pub fn with_asset_base(mut self, base: &str) -> Self {
        self.image_url = self.image_url.map(|path| absolutize(base, path));
        self.background_img = self.background_img.map(|path| absolutize(base, path));
        self
    }
}

fn absolutize(base: &str, path: String) -> String {
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_fills_placeholders() {
        let request = CreatePostRequest {
            title: Some("A".into()),
            content: Some(String::new()),
            ..Default::default()
        };
        let post = request.into_post(7);

        assert_eq!(post.id, 7);
        assert_eq!(post.title, "A");
        assert_eq!(post.description, DEFAULT_DESCRIPTION);
        assert_eq!(post.content, DEFAULT_CONTENT);
        assert_eq!(post.author, Author::default());
        assert!(post.image_url.is_none());
        assert!(post.comments.is_empty());
    }

    #[test]
    fn author_accepts_both_shapes() {
        let plain: Author = serde_json::from_value(json!("Ada")).unwrap();
        assert_eq!(plain, Author::Name("Ada".into()));

        let profile: Author =
            serde_json::from_value(json!({"name": "Ada", "email": "ada@example.com"})).unwrap();
        assert_eq!(
            profile,
            Author::Profile {
                name: "Ada".into(),
                email: Some("ada@example.com".into())
            }
        );

        assert_eq!(Author::from_form_value("Grace"), Author::Name("Grace".into()));
        assert_eq!(
            Author::from_form_value(r#"{"name":"Grace","email":"g@example.com"}"#),
            Author::Profile {
                name: "Grace".into(),
                email: Some("g@example.com".into())
            }
        );
    }

    #[test]
    fn author_profile_without_email_is_accepted() {
        let author: Author = serde_json::from_value(json!({"name": "Ada"})).unwrap();
        assert_eq!(
            author,
            Author::Profile {
                name: "Ada".into(),
                email: None
            }
        );
        assert_eq!(serde_json::to_value(&author).unwrap(), json!({"name": "Ada"}));
    }

    #[test]
    fn unknown_fields_are_kept_but_reserved_ones_are_not() {
        let request: CreatePostRequest = serde_json::from_value(json!({
            "title": "T",
            "category": "rust",
            "tags": ["a", "b"],
            "comments": [{"user": "x", "text": "y"}]
        }))
        .unwrap();
        let post = request.into_post(2);

        assert_eq!(post.extra.get("category"), Some(&json!("rust")));
        assert_eq!(post.extra.get("tags"), Some(&json!(["a", "b"])));
        assert!(post.extra.get("comments").is_none());
        assert!(post.comments.is_empty());

        let stored = serde_json::to_value(&post).unwrap();
        assert_eq!(stored["category"], "rust");
        let reread: Post = serde_json::from_value(stored).unwrap();
        assert_eq!(reread, post);

        let mut post = reread;
        let patch: PostPatch =
            serde_json::from_value(json!({"category": "go", "id": 9})).unwrap();
        patch.apply_to(&mut post);
        assert_eq!(post.id, 2);
        assert_eq!(post.extra.get("category"), Some(&json!("go")));
        assert!(post.extra.get("id").is_none());
    }

    #[test]
    fn post_serializes_with_wire_field_names() {
        let post = CreatePostRequest::default().into_post(1);
        let value = serde_json::to_value(&post).unwrap();
        assert!(value.get("imageURL").is_some());
        assert!(value.get("backgroundimg").is_some());
        assert_eq!(value["comments"], json!([]));
    }

    #[test]
    fn patch_distinguishes_null_from_missing() {
        let mut post = CreatePostRequest {
            image_url: Some("/assets/faces/a.png".into()),
            background_img: Some("/assets/b.png".into()),
            ..Default::default()
        }
        .into_post(1);

        let patch: PostPatch =
            serde_json::from_value(json!({"title": "New", "imageURL": null})).unwrap();
        patch.apply_to(&mut post);

        assert_eq!(post.title, "New");
        assert_eq!(post.description, DEFAULT_DESCRIPTION);
        assert_eq!(post.image_url, None);
        assert_eq!(post.background_img.as_deref(), Some("/assets/b.png"));
    }

    #[test]
    fn asset_paths_become_absolute() {
        let post = CreatePostRequest {
            image_url: Some("/assets/faces/a.png".into()),
            background_img: Some("https://cdn.example.com/b.png".into()),
            ..Default::default()
        }
        .into_post(1)
        .with_asset_base("http://localhost:5000");

        assert_eq!(
            post.image_url.as_deref(),
            Some("http://localhost:5000/assets/faces/a.png")
        );
        assert_eq!(
            post.background_img.as_deref(),
            Some("https://cdn.example.com/b.png")
        );
    }
}

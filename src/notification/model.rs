use serde::Serialize;

use crate::post::post_model::Post;

/// WebSocket message to client
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Subscription established
    Connected { session_id: String },
    /// A post was just created
    NewPost { post: Post },
}

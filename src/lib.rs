//! Blog post content API: posts kept in one JSON document, served over HTTP,
//! with uploaded images and a WebSocket feed of newly created posts.

pub mod assets;
pub mod config;
pub mod middleware;
pub mod notification;
pub mod post;
pub mod router;
pub mod uploader;
pub mod utils;

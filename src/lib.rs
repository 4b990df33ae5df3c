pub mod api_response;
pub mod assets;
pub mod config;
pub mod error;
pub mod logger;
pub mod post;
pub mod post_codec;
pub mod post_store;
pub mod server;
pub mod slug;
pub mod text_utils;
pub mod util;
pub mod view;
mod post_list;
#[cfg(test)]
mod test_data;

pub use error::{Result, StoreError};
pub use post::{NewPost, Post, PostChanges};
pub use post_store::{AuthorDefaults, PostStore};

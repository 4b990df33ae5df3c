use anyhow::Result;

use inkpost::text_utils::format_timestamp;
use inkpost::{AuthorDefaults, Post, PostStore};

use crate::{resolve_data_dir, ListArgs};

fn render_line(post: &Post) -> String {
    let state = if post.published { "published" } else { "draft" };
    format!("{}  {}  [{}]  {}", post.slug, format_timestamp(&post.created_at), state, post.title)
}

pub fn list_cmd(args: ListArgs) -> Result<()> {
    let data_dir = resolve_data_dir(args.data_dir);
    let store = PostStore::open(&data_dir, AuthorDefaults::default())?;

    let posts = store.list_all()?;
    for post in posts.iter() {
        println!("{}", render_line(post));
    }
    println!("{} post(s) in {}", posts.len(), data_dir.display());
    Ok(())
}

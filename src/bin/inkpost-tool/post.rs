use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};

use inkpost::util::os_helper::os_author;
use inkpost::{NewPost, PostStore};

use crate::{resolve_data_dir, PostArgs};

fn read_body(args: &PostArgs) -> Result<String> {
    match args.file {
        Some(ref file) => fs::read_to_string(file)
            .with_context(|| format!("Could not read {}", file.display())),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("Could not read the post body from stdin")?;
            Ok(buf)
        }
    }
}

fn build_post(args: &PostArgs, content: String) -> NewPost {
    let mut author = os_author();
    if let Some(ref name) = args.name {
        author.name = name.clone();
    }

    NewPost {
        title: args.title.clone(),
        content,
        author_name: Some(author.name),
        author_username: Some(author.username),
        slug: args.slug.clone(),
        published: args.publish,
        ..Default::default()
    }
}

pub fn post_cmd(args: PostArgs) -> Result<()> {
    let content = read_body(&args)?;
    let new_post = build_post(&args, content);

    let data_dir = resolve_data_dir(args.data_dir.clone());
    let store = PostStore::open(&data_dir, os_author())?;
    let post = store.create(new_post)?;

    println!("Created {} in {}", post.slug, data_dir.join(&post.slug).display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(name: Option<&str>) -> PostArgs {
        PostArgs {
            title: "This is a title".to_string(),
            file: None,
            name: name.map(str::to_string),
            slug: None,
            publish: true,
            data_dir: None,
        }
    }

    #[test]
    fn test_build_post() {
        let post = build_post(&args(Some("Thiago")), "Body".to_string());
        assert_eq!(post.title, "This is a title");
        assert_eq!(post.content, "Body");
        assert_eq!(post.author_name.as_deref(), Some("Thiago"));
        assert!(post.slug.is_none());
        assert!(post.published);
        assert!(post.validate().is_ok());
    }

    #[test]
    fn test_build_post_os_author() {
        let post = build_post(&args(None), "Body".to_string());
        assert_eq!(post.author_name, Some(os_author().name));
    }
}

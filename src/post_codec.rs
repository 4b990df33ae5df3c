use std::{fs, io};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spdlog::warn;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::post::Post;
use crate::text_utils::{format_timestamp, now_timestamp, parse_timestamp};

pub const CONTENT_FILE: &str = "content.md";
pub const METADATA_FILE: &str = "metadata.json";

/// Example of metadata.json
/// {
///   "id": "a63bd715-a3fe-4788-b0e1-2a3153778544",
///   "slug": "what-i-learned",
///   "title": "What I learned after 20+ years of software development",
///   "author_name": "John Doe",
///   "author_username": "johndoe",
///   "meta_name": "What I learned after 20+ years of software development",
///   "meta_description": "Read about What I learned after 20+ years of software development",
///   "created": "2022-04-02T12:05:00.000Z",
///   "updated": "2022-04-02T12:05:00.000Z",
///   "published": true
/// }
#[derive(Serialize, Deserialize)]
struct PostMetadata {
    id: Option<String>,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    author_username: String,
    #[serde(default)]
    meta_name: String,
    #[serde(default)]
    meta_description: String,
    created: Option<String>,
    updated: Option<String>,
    #[serde(default)]
    published: bool,
}

impl From<&Post> for PostMetadata {
    fn from(post: &Post) -> Self {
        PostMetadata {
            id: Some(post.id.to_string()),
            slug: post.slug.clone(),
            title: post.title.clone(),
            author_name: post.author_name.clone(),
            author_username: post.author_username.clone(),
            meta_name: post.meta_title.clone(),
            meta_description: post.meta_description.clone(),
            created: Some(format_timestamp(&post.created_at)),
            updated: Some(format_timestamp(&post.updated_at)),
            published: post.published,
        }
    }
}

pub fn content_path(post_dir: &Path) -> PathBuf {
    post_dir.join(CONTENT_FILE)
}

pub fn metadata_path(post_dir: &Path) -> PathBuf {
    post_dir.join(METADATA_FILE)
}

fn staging_path(post_dir: &Path, file_name: &str) -> PathBuf {
    post_dir.join(format!("{}.tmp", file_name))
}

/// Writes `post` into `post_dir`, creating the directory if needed.
///
/// Both files are staged next to the real ones first. A failure while staging
/// leaves the previous files untouched. The metadata file is moved into place
/// last, so it only ever describes a body that is already on disk.
pub fn write_post(post: &Post, post_dir: &Path) -> Result<()> {
    fs::create_dir_all(post_dir)
        .map_err(|e| StoreError::io(format!("failed to create post directory {}", post_dir.display()), e))?;

    let metadata = PostMetadata::from(post);
    let metadata_data = serde_json::to_string_pretty(&metadata)
        .map_err(|e| StoreError::io("failed to serialize metadata", io::Error::new(ErrorKind::InvalidData, e)))?;

    let content_tmp = staging_path(post_dir, CONTENT_FILE);
    let metadata_tmp = staging_path(post_dir, METADATA_FILE);

    let staged = stage_file(&content_tmp, post.content.as_bytes())
        .and_then(|_| stage_file(&metadata_tmp, metadata_data.as_bytes()))
        .and_then(|_| commit_file(&content_tmp, &content_path(post_dir)))
        .and_then(|_| commit_file(&metadata_tmp, &metadata_path(post_dir)));

    if staged.is_err() {
        discard_file(&content_tmp);
        discard_file(&metadata_tmp);
    }
    staged
}

fn stage_file(tmp_file: &Path, data: &[u8]) -> Result<()> {
    fs::write(tmp_file, data)
        .map_err(|e| StoreError::io(format!("failed to write {}", tmp_file.display()), e))
}

fn commit_file(tmp_file: &Path, file: &Path) -> Result<()> {
    fs::rename(tmp_file, file)
        .map_err(|e| StoreError::io(format!("failed to replace {}", file.display()), e))
}

fn discard_file(tmp_file: &Path) {
    if let Err(e) = fs::remove_file(tmp_file) {
        if e.kind() != ErrorKind::NotFound {
            warn!("Could not remove {}: {}", tmp_file.display(), e);
        }
    }
}

/// Reads the post stored in `post_dir`.
pub fn read_post(post_dir: &Path) -> Result<Post> {
    let metadata_data = read_file(&metadata_path(post_dir))?;
    let content = read_file(&content_path(post_dir))?;

    let metadata: PostMetadata = serde_json::from_str(&metadata_data)
        .map_err(|e| StoreError::corrupt(post_dir, format!("invalid metadata: {}", e)))?;

    let id = match metadata.id {
        Some(ref id) => Uuid::parse_str(id)
            .map_err(|e| StoreError::corrupt(post_dir, format!("invalid id {}: {}", id, e)))?,
        None => return Err(StoreError::corrupt(post_dir, "missing id")),
    };

    let created_at = decode_timestamp(post_dir, "created", metadata.created.as_deref());
    let updated_at = decode_timestamp(post_dir, "updated", metadata.updated.as_deref());
    let updated_at = updated_at.max(created_at);

    Ok(Post {
        id,
        title: metadata.title,
        content,
        author_name: metadata.author_name,
        author_username: metadata.author_username,
        meta_title: metadata.meta_name,
        meta_description: metadata.meta_description,
        slug: metadata.slug,
        created_at,
        updated_at,
        published: metadata.published,
    })
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => StoreError::NotFound(path.display().to_string()),
        ErrorKind::InvalidData => StoreError::corrupt(path, format!("not valid UTF-8: {}", e)),
        _ => StoreError::io(format!("failed to read {}", path.display()), e),
    })
}

// Malformed timestamps become "now" instead of hiding the post
fn decode_timestamp(post_dir: &Path, field: &str, value: Option<&str>) -> DateTime<Utc> {
    let parsed = match value {
        Some(value) => parse_timestamp(value),
        None => Err(format!("missing {} timestamp", field)),
    };

    match parsed {
        Ok(dt) => dt,
        Err(e) => {
            warn!("Using current time for {} of {}: {}", field, post_dir.display(), e);
            now_timestamp()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use crate::test_data::{LEGACY_CONTENT, LEGACY_METADATA};

    use super::*;

    fn sample_post() -> Post {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        Post {
            id: Uuid::new_v4(),
            title: "Hello, World!".to_string(),
            content: "# Hello\n\nSome *markdown* body.\n".to_string(),
            author_name: "John Doe".to_string(),
            author_username: "johndoe".to_string(),
            meta_title: "Hello, World!".to_string(),
            meta_description: "Read about Hello, World!".to_string(),
            slug: "hello-world".to_string(),
            created_at: created,
            updated_at: created + chrono::Duration::milliseconds(1500),
            published: true,
        }
    }

    #[test]
    fn test_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let post_dir = tmp.path().join("hello-world");
        let post = sample_post();

        write_post(&post, &post_dir).unwrap();
        assert!(post_dir.join(CONTENT_FILE).is_file());
        assert!(post_dir.join(METADATA_FILE).is_file());
        assert!(!post_dir.join("metadata.json.tmp").exists());
        assert!(!post_dir.join("content.md.tmp").exists());
        assert_eq!(fs::read_to_string(post_dir.join(CONTENT_FILE)).unwrap(), post.content);

        let read = read_post(&post_dir).unwrap();
        assert_eq!(read, post);
    }

    #[test]
    fn test_metadata_keys() {
        let tmp = TempDir::new().unwrap();
        let post = sample_post();
        write_post(&post, tmp.path()).unwrap();

        let raw = fs::read_to_string(tmp.path().join(METADATA_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["id"], post.id.to_string());
        assert_eq!(json["slug"], "hello-world");
        assert_eq!(json["meta_name"], "Hello, World!");
        assert_eq!(json["created"], "2024-01-02T03:04:05.000Z");
        assert_eq!(json["updated"], "2024-01-02T03:04:06.500Z");
        assert_eq!(json["published"], true);
        assert!(json.get("content").is_none());
    }

    #[test]
    fn test_read_legacy_metadata() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(METADATA_FILE), LEGACY_METADATA).unwrap();
        fs::write(tmp.path().join(CONTENT_FILE), LEGACY_CONTENT).unwrap();

        let post = read_post(tmp.path()).unwrap();
        assert_eq!(post.slug, "what-i-learned");
        assert_eq!(post.created_at, Utc.with_ymd_and_hms(2022, 4, 2, 10, 5, 0).unwrap());
        assert_eq!(post.updated_at, Utc.with_ymd_and_hms(2022, 4, 3, 8, 0, 0).unwrap());
        assert_eq!(post.content, LEGACY_CONTENT);
        assert!(post.published);
    }

    #[test]
    fn test_missing_files() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(read_post(tmp.path()), Err(StoreError::NotFound(_))));

        fs::write(tmp.path().join(CONTENT_FILE), "body").unwrap();
        assert!(matches!(read_post(tmp.path()), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_metadata() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONTENT_FILE), "body").unwrap();

        fs::write(tmp.path().join(METADATA_FILE), "{ not json").unwrap();
        assert!(matches!(read_post(tmp.path()), Err(StoreError::Corrupt { .. })));

        fs::write(tmp.path().join(METADATA_FILE), r#"{"id": "not-a-uuid", "slug": "x"}"#).unwrap();
        assert!(matches!(read_post(tmp.path()), Err(StoreError::Corrupt { .. })));

        fs::write(tmp.path().join(METADATA_FILE), r#"{"slug": "x"}"#).unwrap();
        assert!(matches!(read_post(tmp.path()), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_bad_timestamps_fall_back_to_now() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONTENT_FILE), "body").unwrap();
        fs::write(tmp.path().join(METADATA_FILE), r#"{
            "id": "a63bd715-a3fe-4788-b0e1-2a3153778544",
            "slug": "x",
            "created": "last tuesday"
        }"#).unwrap();

        let before = now_timestamp();
        let post = read_post(tmp.path()).unwrap();
        assert!(post.created_at >= before);
        assert!(post.updated_at >= post.created_at);
        assert_eq!(post.title, "");
        assert!(!post.published);
    }

    #[test]
    fn test_failed_write_keeps_previous_post() {
        let tmp = TempDir::new().unwrap();
        let post = sample_post();
        write_post(&post, tmp.path()).unwrap();

        let mut changed = post.clone();
        changed.title = "Changed".to_string();
        changed.content = "changed body".to_string();

        // A directory in the staging spot makes the write fail
        for blocked in [CONTENT_FILE, METADATA_FILE] {
            let blocker = staging_path(tmp.path(), blocked);
            fs::create_dir(&blocker).unwrap();

            let err = write_post(&changed, tmp.path()).unwrap_err();
            assert!(matches!(err, StoreError::Io { .. }), "{}", blocked);
            assert_eq!(read_post(tmp.path()).unwrap(), post, "{}", blocked);

            fs::remove_dir(&blocker).unwrap();
            assert!(!staging_path(tmp.path(), CONTENT_FILE).exists());
            assert!(!staging_path(tmp.path(), METADATA_FILE).exists());
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Duration;
use spdlog::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::post::{NewPost, Post, PostChanges};
use crate::post_codec::{read_post, write_post};
use crate::post_list::PostList;
use crate::slug::{is_valid_slug, slugify};
use crate::text_utils::now_timestamp;

pub const DEFAULT_AUTHOR_NAME: &str = "John Doe";
pub const DEFAULT_AUTHOR_USERNAME: &str = "johndoe";

#[derive(Debug, Clone)]
pub struct AuthorDefaults {
    pub name: String,
    pub username: String,
}

impl Default for AuthorDefaults {
    fn default() -> Self {
        AuthorDefaults {
            name: DEFAULT_AUTHOR_NAME.to_string(),
            username: DEFAULT_AUTHOR_USERNAME.to_string(),
        }
    }
}

/// File backed post store. One directory per post, named by its slug,
/// directly under `root_dir`.
///
/// Nothing is cached between calls: every read scans the data root again, so
/// edits made out of band are always visible. A single reader/writer lock
/// covers the whole tree; listings share it, mutations take it exclusively
/// for their whole file sequence so a scan never sees half a post.
pub struct PostStore {
    root_dir: PathBuf,
    defaults: AuthorDefaults,
    lock: RwLock<()>,
}

impl PostStore {
    /// Opens the store, creating the data root if it does not exist.
    pub fn open(root_dir: impl Into<PathBuf>, defaults: AuthorDefaults) -> Result<Self> {
        let root_dir = root_dir.into();
        fs::create_dir_all(&root_dir)
            .map_err(|e| StoreError::io(format!("failed to create data directory {}", root_dir.display()), e))?;

        Ok(PostStore {
            root_dir,
            defaults,
            lock: RwLock::new(()),
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// All posts, newest `created_at` first.
    pub fn list_all(&self) -> Result<Vec<Post>> {
        let _reader = self.read_lock();
        self.load_all()
    }

    pub fn get_by_slug(&self, slug: &str) -> Result<Post> {
        let _reader = self.read_lock();
        self.load_all()?
            .into_iter()
            .find(|post| post.slug == slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }

    pub fn create(&self, new_post: NewPost) -> Result<Post> {
        new_post.validate()?;

        let slug = match new_post.slug {
            Some(ref slug) if !slug.is_empty() => {
                if !is_valid_slug(slug) {
                    return Err(StoreError::validation("slug", format!("Invalid slug: {}", slug)));
                }
                slug.clone()
            }
            _ => {
                let slug = slugify(&new_post.title);
                if slug.is_empty() {
                    return Err(StoreError::validation("slug", "Could not generate a slug from the title"));
                }
                slug
            }
        };

        let _writer = self.write_lock();

        let post_dir = self.post_dir(&slug);
        if post_dir.exists() {
            return Err(StoreError::SlugConflict(slug));
        }

        let now = now_timestamp();
        let post = Post {
            id: Uuid::new_v4(),
            author_name: non_empty_or(new_post.author_name, || self.defaults.name.clone()),
            author_username: non_empty_or(new_post.author_username, || self.defaults.username.clone()),
            meta_title: non_empty_or(new_post.meta_title, || new_post.title.clone()),
            meta_description: non_empty_or(new_post.meta_description, || format!("Read about {}", new_post.title)),
            title: new_post.title,
            content: new_post.content,
            slug,
            created_at: now,
            updated_at: now,
            published: new_post.published,
        };

        if let Err(e) = write_post(&post, &post_dir) {
            if let Err(cleanup) = fs::remove_dir_all(&post_dir) {
                warn!("Could not clean up {} after failed create: {}", post_dir.display(), cleanup);
            }
            return Err(e);
        }

        info!("Created post {} ({})", post.slug, post.id);
        Ok(post)
    }

    pub fn update_by_slug(&self, slug: &str, changes: PostChanges) -> Result<Post> {
        if let Some(ref new_slug) = changes.slug {
            if !is_valid_slug(new_slug) {
                return Err(StoreError::validation("slug", format!("Invalid slug: {}", new_slug)));
            }
        }

        let _writer = self.write_lock();

        let posts = self.load_all()?;
        let existing = posts.iter()
            .find(|post| post.slug == slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;

        let old_slug = existing.slug.clone();
        let new_slug = changes.slug.clone().unwrap_or_else(|| old_slug.clone());
        let renamed = new_slug != old_slug;

        if renamed {
            let taken = posts.iter().any(|post| post.slug == new_slug && post.id != existing.id);
            if taken || self.post_dir(&new_slug).exists() {
                return Err(StoreError::SlugConflict(new_slug));
            }
        }

        let mut post = existing.clone();
        changes.apply_to(&mut post);
        // Stored timestamps keep milliseconds, an update must still move forward
        post.updated_at = now_timestamp().max(existing.updated_at + Duration::milliseconds(1));

        let old_dir = self.post_dir(&old_slug);
        let new_dir = self.post_dir(&new_slug);
        if renamed {
            fs::rename(&old_dir, &new_dir)
                .map_err(|e| StoreError::io(format!("failed to rename post directory {} to {}", old_slug, new_slug), e))?;
        }

        if let Err(e) = write_post(&post, &new_dir) {
            Self::restore(existing, &old_dir, renamed.then_some(new_dir.as_path()));
            return Err(e);
        }

        if renamed {
            info!("Updated post {} (renamed from {})", post.slug, old_slug);
        } else {
            info!("Updated post {}", post.slug);
        }
        Ok(post)
    }

    pub fn delete_by_slug(&self, slug: &str) -> Result<()> {
        let _writer = self.write_lock();

        let exists = self.load_all()?.iter().any(|post| post.slug == slug);
        if !exists {
            return Err(StoreError::NotFound(slug.to_string()));
        }

        let post_dir = self.post_dir(slug);
        fs::remove_dir_all(&post_dir)
            .map_err(|e| StoreError::io(format!("failed to delete post directory {}", post_dir.display()), e))?;

        info!("Deleted post {}", slug);
        Ok(())
    }

    /// Puts `previous` back in `old_dir` after a failed update, moving the
    /// directory back first when the update had renamed it to `moved_to`.
    fn restore(previous: &Post, old_dir: &Path, moved_to: Option<&Path>) {
        if let Some(moved_to) = moved_to {
            if let Err(e) = fs::rename(moved_to, old_dir) {
                warn!("Could not move {} back to {}: {}", moved_to.display(), old_dir.display(), e);
                return;
            }
        }

        if let Err(e) = write_post(previous, old_dir) {
            warn!("Could not restore post {}: {}", previous.slug, e);
        }
    }

    fn post_dir(&self, slug: &str) -> PathBuf {
        self.root_dir.join(slug)
    }

    // Caller must hold the lock
    fn load_all(&self) -> Result<Vec<Post>> {
        let post_list = PostList { root_dir: self.root_dir.clone() };
        let dirs = post_list.retrieve_dirs()
            .map_err(|e| StoreError::io(format!("failed to read data directory {}", self.root_dir.display()), e))?;

        let mut posts = Vec::with_capacity(dirs.len());
        let mut skipped = 0;
        for dir in dirs {
            match Self::load_post(&dir) {
                Ok(post) => posts.push(post),
                // Undecodable, or gone since the scan
                Err(e @ (StoreError::Corrupt { .. } | StoreError::NotFound(_))) => {
                    warn!("Skipping post directory {}: {}", dir.display(), e);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if skipped > 0 {
            debug!("Listing skipped {} unreadable post(s), {} loaded", skipped, posts.len());
        }

        // Newest first
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    fn load_post(dir: &Path) -> Result<Post> {
        let post = read_post(dir)?;
        let dir_name = dir.file_name().and_then(|name| name.to_str()).unwrap_or_default();
        if post.slug != dir_name {
            return Err(StoreError::corrupt(dir, format!("metadata slug {} does not match its directory", post.slug)));
        }
        Ok(post)
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, ()> {
        // The lock guards no data, a poisoned one is still usable
        self.lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn non_empty_or(value: Option<String>, fallback: impl FnOnce() -> String) -> String {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => fallback(),
    }
}

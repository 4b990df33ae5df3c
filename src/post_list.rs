use std::{fs, io};
use std::path::{Path, PathBuf};

use crate::post_codec::{CONTENT_FILE, METADATA_FILE};

/// Finds the post directories under the data root.
pub struct PostList {
    pub root_dir: PathBuf,
}

impl PostList {
    /// Immediate subdirectories of the root holding both the body and the
    /// metadata file. Anything else is not a post.
    pub fn retrieve_dirs(&self) -> io::Result<Vec<PathBuf>> {
        let dirs = Self::list_dirs(self.root_dir.as_path())?;
        Ok(Self::filter_dirs(dirs))
    }

    fn list_dirs(posts_dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs: Vec<PathBuf> = vec![];
        let entries = fs::read_dir(posts_dir)?;
        for entry in entries {
            if let Ok(path) = entry {
                if let Ok(file_type) = path.file_type() {
                    if file_type.is_dir() {
                        dirs.push(path.path());
                    }
                }
            }
        }
        Ok(dirs)
    }

    fn filter_dirs(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
        dirs.into_iter()
            .filter(|dir| Self::contains_file(dir, CONTENT_FILE) && Self::contains_file(dir, METADATA_FILE))
            .collect()
    }

    fn contains_file(dir: &Path, file_name: &str) -> bool {
        dir.join(file_name).is_file()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_retrieve_dirs() -> io::Result<()> {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        fs::create_dir(root.join("complete"))?;
        fs::write(root.join("complete").join(CONTENT_FILE), "body")?;
        fs::write(root.join("complete").join(METADATA_FILE), "{}")?;

        fs::create_dir(root.join("body-only"))?;
        fs::write(root.join("body-only").join(CONTENT_FILE), "body")?;

        fs::create_dir(root.join("metadata-only"))?;
        fs::write(root.join("metadata-only").join(METADATA_FILE), "{}")?;

        fs::create_dir(root.join("empty"))?;
        fs::write(root.join("stray.md"), "not a post")?;

        let post_list = PostList { root_dir: root.to_path_buf() };
        let dirs = post_list.retrieve_dirs()?;
        assert_eq!(dirs, vec![root.join("complete")]);
        Ok(())
    }

    #[test]
    fn test_missing_root() {
        let tmp = TempDir::new().unwrap();
        let post_list = PostList { root_dir: tmp.path().join("nope") };
        assert!(post_list.retrieve_dirs().is_err());
    }
}

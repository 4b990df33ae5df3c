use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Hashed bundle names produced by the frontend build, e.g. `index-4f1c2a.js`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetInfo {
    pub js_file: String,
    pub css_file: String,
}

/// A frontend build directory and the bundles found in it.
#[derive(Debug, Clone)]
pub struct Frontend {
    pub static_dir: PathBuf,
    pub assets: AssetInfo,
}

impl Frontend {
    /// `None` when no static dir is configured or it has not been built yet.
    pub fn discover(static_dir: Option<&Path>) -> io::Result<Option<Frontend>> {
        let Some(static_dir) = static_dir.filter(|dir| dir.is_dir()) else {
            return Ok(None);
        };

        let assets = find_asset_files(static_dir)?;
        Ok(Some(Frontend { static_dir: static_dir.to_path_buf(), assets }))
    }
}

pub fn find_asset_files(static_dir: &Path) -> io::Result<AssetInfo> {
    let assets_dir = static_dir.join("assets");
    let mut js_files = vec![];
    let mut css_files = vec![];

    for entry in fs::read_dir(&assets_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !file_name.starts_with("index-") {
            continue;
        }
        if file_name.ends_with(".js") {
            js_files.push(file_name);
        } else if file_name.ends_with(".css") {
            css_files.push(file_name);
        }
    }

    // read_dir order is unspecified
    js_files.sort();
    css_files.sort();

    let js_file = js_files.into_iter().next()
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, format!("No JS bundle found in {}", assets_dir.display())))?;
    let css_file = css_files.into_iter().next()
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, format!("No CSS bundle found in {}", assets_dir.display())))?;

    Ok(AssetInfo { js_file, css_file })
}

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::post_store::{AuthorDefaults, DEFAULT_AUTHOR_NAME, DEFAULT_AUTHOR_USERNAME};

pub const DATA_DIR_ENV: &str = "BLOG_DATA_DIR";
pub const PORT_ENV: &str = "PORT";

#[derive(Deserialize)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub template_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
}

#[derive(Deserialize, Default)]
pub struct Defaults {
    pub author_name: Option<String>,
    pub author_username: Option<String>,
}

impl Defaults {
    pub fn author_defaults(&self) -> AuthorDefaults {
        AuthorDefaults {
            name: self.author_name.clone().unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string()),
            username: self.author_username.clone().unwrap_or_else(|| DEFAULT_AUTHOR_USERNAME.to_string()),
        }
    }
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub paths: Paths,
    #[serde(default)]
    pub defaults: Defaults,
    pub server: Server,
    pub log: Option<Log>,
}

impl Config {
    /// `BLOG_DATA_DIR` and `PORT` win over the file, as deployments set them.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> io::Result<()>
        where F: Fn(&str) -> Option<String>
    {
        if let Some(data_dir) = lookup(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.paths.data_dir = PathBuf::from(data_dir);
        }

        if let Some(port) = lookup(PORT_ENV).filter(|v| !v.is_empty()) {
            self.server.port = port.parse().map_err(|e| io::Error::new(
                ErrorKind::InvalidInput, format!("Invalid {} value {}: {}", PORT_ENV, port, e)))?;
        }

        Ok(())
    }
}

fn parse_path(path: PathBuf, exe_dir: &Path) -> PathBuf {
    match path.strip_prefix("${exe_dir}") {
        Ok(rest) => exe_dir.join(rest),
        Err(_) => path,
    }
}

fn exe_dir() -> io::Result<PathBuf> {
    let cur_exe = env::current_exe()?;
    cur_exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Could not find the executable directory"))
}

pub fn parse_config(cfg_content: &str, exe_dir: &Path) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        data_dir: parse_path(cfg.paths.data_dir, exe_dir),
        template_dir: parse_path(cfg.paths.template_dir, exe_dir),
        static_dir: cfg.paths.static_dir.map(|p| parse_path(p, exe_dir)),
    };

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    let mut cfg = parse_config(&cfg_content, &exe_dir()?)?;
    cfg.apply_env_overrides(|key| env::var(key).ok())?;
    Ok(cfg)
}

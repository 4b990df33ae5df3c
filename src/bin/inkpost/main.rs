use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use spdlog::{info, warn};

use inkpost::assets::Frontend;
use inkpost::logger::configure_logger;
use inkpost::server::server_run;
use inkpost::PostStore;

use crate::config::open_config;

mod config;

const CFG_FILE_NAME: &str = "inkpost.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path. Searched next to the executable, in the current and in the user config directory otherwise
    #[arg(short, long)]
    config_path: Option<PathBuf>,
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = open_config(args.config_path)
        .context("Inkpost could not start, see inkpost --help")?;

    if let Some(ref log) = config.log {
        if let Err(err) = configure_logger(log) {
            warn!("Could not set up the log sinks, staying on the console: {}", err);
        }
    }

    let store = PostStore::open(&config.paths.data_dir, config.defaults.author_defaults())
        .context("Could not open the blog data directory")?;
    let post_count = store.list_all().map(|posts| posts.len())
        .context("Could not read the blog data directory")?;
    info!("Serving {} post(s) from {}", post_count, store.root_dir().display());

    let frontend = Frontend::discover(config.paths.static_dir.as_deref())
        .context("Frontend build is missing its bundles")?;
    match frontend {
        Some(ref frontend) => info!("Frontend {}: JS={}, CSS={}",
            frontend.static_dir.display(), frontend.assets.js_file, frontend.assets.css_file),
        None => info!("No frontend build, pages are rendered without assets"),
    }

    info!("Listening on {}:{}", config.server.address, config.server.port);
    server_run(config, store, frontend).await?;
    Ok(())
}

use std::env;
use std::path::PathBuf;

use clap::{arg, Parser};

use inkpost::config::DATA_DIR_ENV;

use crate::bootstrap::bootstrap_cmd;
use crate::list::list_cmd;
use crate::post::post_cmd;

mod bootstrap;
mod list;
mod post;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
enum Args {
    /// Create a post in the data directory
    Post(PostArgs),
    /// List the posts in the data directory
    List(ListArgs),
    /// Write a sample configuration and page templates
    Bootstrap(BootstrapArgs),
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct PostArgs {
    /// Title of the post
    #[arg(short, long)]
    title: String,

    /// Markdown file with the post body. Reads stdin when missing
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Name of the author. If empty, OS user real name is being used
    #[arg(short, long)]
    name: Option<String>,

    /// Url name of the post. Generated from the title when missing
    #[arg(short, long)]
    slug: Option<String>,

    /// Publish the post right away
    #[arg(short, long, default_value_t = false)]
    publish: bool,

    /// Blog data directory. Defaults to $BLOG_DATA_DIR, then ./data
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ListArgs {
    /// Blog data directory. Defaults to $BLOG_DATA_DIR, then ./data
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct BootstrapArgs {
    /// Directory where the new blog will be generated
    #[arg(short, long)]
    out_dir: String,
}

fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir
        .or_else(|| env::var(DATA_DIR_ENV).ok().filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn main() {
    let args = Args::parse();

    let res = match args {
        Args::Post(args) => post_cmd(args),
        Args::List(args) => list_cmd(args),
        Args::Bootstrap(args) => bootstrap_cmd(args),
    };

    if let Err(e) = res {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

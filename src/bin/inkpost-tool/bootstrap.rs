use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use regex::Regex;

use crate::BootstrapArgs;

const TEMPLATES: [(&str, &str); 5] = [
    ("index.html", include_str!("../../../res/template/index.html")),
    ("blog.html", include_str!("../../../res/template/blog.html")),
    ("edit.html", include_str!("../../../res/template/edit.html")),
    ("new.html", include_str!("../../../res/template/new.html")),
    ("notfound.html", include_str!("../../../res/template/notfound.html")),
];

fn get_sample_cfg() -> &'static str {
    include_str!("../../../inkpost.toml")
}

fn write_inkpost_cfg(out_dir: &Path) -> Result<()> {
    let file = File::create(out_dir.join("inkpost.toml"))?;
    let mut writer = BufWriter::new(file);

    let sample_cfg = replace_paths(out_dir, get_sample_cfg());
    writer.write_all(sample_cfg.as_bytes())?;

    Ok(writer.flush()?)
}

fn write_templates(out_dir: &Path) -> Result<()> {
    let template_dir = out_dir.join("template");
    fs::create_dir_all(&template_dir)?;
    for (file_name, template) in TEMPLATES {
        fs::write(template_dir.join(file_name), template)
            .with_context(|| format!("Could not write template {}", file_name))?;
    }
    Ok(())
}

// res/data -> <out_dir>/data
fn replace_paths(prefix: &Path, config_data: &str) -> String {
    let prefix = prefix.to_string_lossy();
    let prefix = prefix.trim_end_matches('/');

    let res_regex = Regex::new(r#""res/(\w+)""#).unwrap();
    res_regex.replace_all(config_data, |captures: &regex::Captures| {
        format!("\"{}/{}\"", prefix, &captures[1])
    }).to_string()
}

pub fn bootstrap_cmd(args: BootstrapArgs) -> Result<()> {
    let out_path = PathBuf::from(&args.out_dir);
    let out_path = fs::canonicalize(&out_path)
        .with_context(|| format!("Error converting path to absolute: {}", &args.out_dir))?;

    if !out_path.is_dir() {
        bail!("Output path must be a directory: {}", out_path.display());
    }

    write_templates(&out_path).context("Error writing page templates")?;
    fs::create_dir_all(out_path.join("data")).context("Error creating the data directory")?;
    write_inkpost_cfg(&out_path).context("Error writing Inkpost configuration")?;

    println!("Blog bootstrapped in {}", out_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_cfg() {
        let cfg = get_sample_cfg();
        let res = replace_paths(Path::new("/abs/path/"), cfg);
        assert!(res.contains(r##"data_dir = "/abs/path/data""##));
        assert!(res.contains(r##"template_dir = "/abs/path/template""##));
        assert!(res.contains(r##"static_dir = "frontend/dist""##));

        let cfg = inkpost::config::parse_config(&res, Path::new("/")).unwrap();
        assert_eq!(cfg.paths.data_dir, PathBuf::from("/abs/path/data"));
    }

    #[test]
    fn test_templates_parse() {
        for (file_name, template) in TEMPLATES {
            assert!(inkpost::view::page_renderer::PageRenderer::new(template).is_ok(), "{}", file_name);
        }
    }
}

use lazy_static::lazy_static;
use regex::Regex;

/// Turns a post title into its url name
/// "Hello, World!" -> "hello-world"
pub fn slugify(title: &str) -> String {
    lazy_static! {
        static ref HYPHEN_RUN: Regex = Regex::new(r"-{2,}").unwrap();
    }

    let slug: String = title.to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .filter(|&c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        .collect();

    let slug = HYPHEN_RUN.replace_all(&slug, "-");
    slug.trim_matches('-').to_string()
}

/// A slug is accepted only in the shape `slugify` produces: lowercase ascii
/// letters and digits joined by single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.split('-').all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
}

use std::io;
use std::io::ErrorKind;

use markdown::Options;
use ramhorns::Template;
use serde::Serialize;

use crate::assets::AssetInfo;
use crate::post::Post;

pub const SITE_TITLE: &str = "Inkpost";
pub const SITE_DESCRIPTION: &str = "A markdown blog stored as plain files";

#[derive(ramhorns::Content)]
struct PageView<'a> {
    title: &'a str,
    description: &'a str,
    base_url: &'a str,
    blog_data: &'a str,
    slug: &'a str,
    post_title: &'a str,
    post_html: &'a str,
    js_file: &'a str,
    css_file: &'a str,
}

/// What every server rendered page needs besides its own data.
pub struct PageContext<'a> {
    pub base_url: &'a str,
    pub assets: &'a AssetInfo,
}

pub struct PageRenderer<'a> {
    pub template: Template<'a>,
}

impl PageRenderer<'_> {
    pub fn new(page_tpl_src: &str) -> io::Result<PageRenderer> {
        let template = match Template::new(page_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing page template: {}", e)));
            }
        };

        Ok(PageRenderer {
            template,
        })
    }

    /// Home page. The frontend hydrates from the embedded post list.
    pub fn render_index(&self, posts: &[Post], ctx: &PageContext) -> io::Result<String> {
        let blog_data = embed_json(posts)?;
        Ok(self.render(PageView {
            title: SITE_TITLE,
            description: SITE_DESCRIPTION,
            base_url: ctx.base_url,
            blog_data: &blog_data,
            slug: "",
            post_title: "",
            post_html: "",
            js_file: &ctx.assets.js_file,
            css_file: &ctx.assets.css_file,
        }))
    }

    pub fn render_post(&self, post: &Post, ctx: &PageContext) -> io::Result<String> {
        let blog_data = embed_json(post)?;
        let post_html = render_markdown(&post.content)?;
        Ok(self.render(PageView {
            title: &post.meta_title,
            description: &post.meta_description,
            base_url: ctx.base_url,
            blog_data: &blog_data,
            slug: &post.slug,
            post_title: &post.title,
            post_html: &post_html,
            js_file: &ctx.assets.js_file,
            css_file: &ctx.assets.css_file,
        }))
    }

    /// Edit form, prefilled from the embedded post.
    pub fn render_editor(&self, post: &Post, ctx: &PageContext) -> io::Result<String> {
        let blog_data = embed_json(post)?;
        Ok(self.render(PageView {
            title: &post.meta_title,
            description: &post.meta_description,
            base_url: ctx.base_url,
            blog_data: &blog_data,
            slug: &post.slug,
            post_title: &post.title,
            post_html: "",
            js_file: &ctx.assets.js_file,
            css_file: &ctx.assets.css_file,
        }))
    }

    /// Pages without post data: new post form and not found.
    pub fn render_shell(&self, ctx: &PageContext) -> String {
        self.render(PageView {
            title: SITE_TITLE,
            description: SITE_DESCRIPTION,
            base_url: ctx.base_url,
            blog_data: "null",
            slug: "",
            post_title: "",
            post_html: "",
            js_file: &ctx.assets.js_file,
            css_file: &ctx.assets.css_file,
        })
    }

    fn render(&self, view: PageView) -> String {
        self.template.render(&view)
    }
}

/// JSON safe to drop inside a `<script>` element.
pub fn embed_json<T: Serialize + ?Sized>(value: &T) -> io::Result<String> {
    let json = serde_json::to_string(value)
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("Error serializing blog data: {}", e)))?;
    Ok(json.replace("</", "<\\/"))
}

fn render_markdown(md_text: &str) -> io::Result<String> {
    match markdown::to_html_with_options(md_text, &Options::gfm()) {
        Ok(x) => Ok(x),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, e.reason.as_str())),
    }
}

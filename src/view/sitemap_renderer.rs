use std::io::Cursor;

use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::post::Post;
use crate::text_utils::format_date;

/* Example
<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://blog.example.com/</loc>
    <lastmod>2024-04-22</lastmod>
    <changefreq>daily</changefreq>
    <priority>1.0</priority>
  </url>
  <url>
    <loc>https://blog.example.com/blogs/hello-world</loc>
    <lastmod>2024-04-20</lastmod>
    <changefreq>monthly</changefreq>
    <priority>0.8</priority>
  </url>
</urlset>
*/

pub struct Sitemap<'a> {
    pub base_url: &'a str,
}

impl<'a> Sitemap<'a> {
    /// Root page plus every published post. Drafts are left out.
    pub fn render(&self, posts: &[Post], today: NaiveDate) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        let base_url = self.base_url.trim_end_matches('/');

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut urlset = BytesStart::new("urlset");
        urlset.push_attribute(("xmlns", "http://www.sitemaps.org/schemas/sitemap/0.9"));
        writer.write_event(Event::Start(urlset))?;

        let root = format!("{}/", base_url);
        let lastmod = today.format("%Y-%m-%d").to_string();
        push_url(&mut writer, &root, &lastmod, "daily", "1.0")?;

        for post in posts.iter().filter(|post| post.published) {
            let loc = format!("{}/blogs/{}", base_url, post.slug);
            push_url(&mut writer, &loc, &format_date(&post.updated_at), "monthly", "0.8")?;
        }

        writer.write_event(Event::End(BytesEnd::new("urlset")))?;

        Ok(writer.into_inner().into_inner())
    }
}

fn push_url(writer: &mut Writer<Cursor<Vec<u8>>>, loc: &str, lastmod: &str, changefreq: &str, priority: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("url")))?;
    push_text(writer, "loc", loc)?;
    push_text(writer, "lastmod", lastmod)?;
    push_text(writer, "changefreq", changefreq)?;
    push_text(writer, "priority", priority)?;
    writer.write_event(Event::End(BytesEnd::new("url")))?;
    Ok(())
}

fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

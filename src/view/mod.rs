pub mod page_renderer;
pub mod sitemap_renderer;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use ntex::http::header::HOST;
use ntex::http::StatusCode;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::error;

use crate::api_response::{ApiResponse, HealthStatus};
use crate::assets::{AssetInfo, Frontend};
use crate::config::Config;
use crate::error::StoreError;
use crate::post::{NewPost, PostChanges};
use crate::post_store::PostStore;
use crate::view::page_renderer::{PageContext, PageRenderer};
use crate::view::sitemap_renderer::Sitemap;

struct AppState {
    store: PostStore,
    template_dir: PathBuf,
    static_dir: Option<PathBuf>,
    assets: AssetInfo,
}

type State = web::types::State<Arc<AppState>>;

// Markdown bodies easily outgrow the default json payload limit
const MAX_JSON_BYTES: usize = 4 * 1024 * 1024;

// Begin: API region --------
#[web::get("/api/health")]
async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&HealthStatus::ok())
}

#[web::get("/api/blogs")]
async fn list_posts(state: State) -> web::HttpResponse {
    match state.store.list_all() {
        Ok(posts) => web::HttpResponse::Ok()
            .json(&ApiResponse::success("Blogs retrieved successfully", Some(posts))),
        Err(e) => error_response("Failed to fetch blogs", &e),
    }
}

#[web::get("/api/blogs/{slug}")]
async fn get_post(slug: web::types::Path<String>, state: State) -> web::HttpResponse {
    match state.store.get_by_slug(&slug) {
        Ok(post) => web::HttpResponse::Ok()
            .json(&ApiResponse::success("Blog retrieved successfully", Some(post))),
        Err(e) => error_response("Failed to fetch blog", &e),
    }
}

#[web::post("/api/blogs")]
async fn create_post(body: web::types::Json<NewPost>, state: State) -> web::HttpResponse {
    let new_post = body.into_inner();
    if let Err(e) = new_post.validate() {
        return error_response("Validation failed", &e);
    }

    match state.store.create(new_post) {
        Ok(post) => web::HttpResponse::Created()
            .json(&ApiResponse::success("Blog created successfully", Some(post))),
        Err(e) => error_response("Failed to create blog", &e),
    }
}

#[web::put("/api/blogs/{slug}")]
async fn update_post(slug: web::types::Path<String>, body: web::types::Json<PostChanges>, state: State) -> web::HttpResponse {
    let changes = body.into_inner();
    if changes.is_empty() {
        return web::HttpResponse::BadRequest()
            .json(&ApiResponse::failure("No fields to update", "At least one field must be provided".to_string()));
    }

    match state.store.update_by_slug(&slug, changes) {
        Ok(post) => web::HttpResponse::Ok()
            .json(&ApiResponse::success("Blog updated successfully", Some(post))),
        Err(e) => error_response("Failed to update blog", &e),
    }
}

#[web::delete("/api/blogs/{slug}")]
async fn delete_post(slug: web::types::Path<String>, state: State) -> web::HttpResponse {
    match state.store.delete_by_slug(&slug) {
        Ok(()) => web::HttpResponse::Ok()
            .json(&ApiResponse::<()>::success("Blog deleted successfully", None)),
        Err(e) => error_response("Failed to delete blog", &e),
    }
}

fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::Validation { .. } => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::SlugConflict(_) => StatusCode::CONFLICT,
        StoreError::Corrupt { .. } | StoreError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(action: &str, err: &StoreError) -> web::HttpResponse {
    let status = status_for(err);
    let message = match err {
        StoreError::Validation { .. } => "Validation failed",
        StoreError::NotFound(_) => "Blog not found",
        StoreError::SlugConflict(_) => "Slug already exists",
        _ => action,
    };

    if status.is_server_error() {
        error!("{}: {}", action, err);
    }

    web::HttpResponse::build(status).json(&ApiResponse::failure(message, err.to_string()))
}
// End: API region --------

// Begin: Server side rendering region --------
fn base_url(req: &HttpRequest) -> String {
    let host = req.headers().get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost:8080");

    if host.contains("localhost") {
        format!("http://{}", host)
    } else {
        format!("https://{}", host)
    }
}

fn render_page<F>(state: &AppState, base_url: &str, template_name: &str, render: F) -> io::Result<String>
    where F: FnOnce(&PageRenderer, &PageContext) -> io::Result<String>
{
    let template_src = std::fs::read_to_string(state.template_dir.join(template_name))?;
    let renderer = PageRenderer::new(&template_src)?;
    let ctx = PageContext { base_url, assets: &state.assets };
    render(&renderer, &ctx)
}

fn html_response(status: StatusCode, rendered: io::Result<String>) -> web::HttpResponse {
    match rendered {
        Ok(page) => web::HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(page),
        Err(e) => {
            error!("Error rendering page: {}", e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error rendering page: {}", e))
        }
    }
}

fn not_found_page(state: &AppState, base_url: &str) -> web::HttpResponse {
    let rendered = render_page(state, base_url, "notfound.html", |r, ctx| Ok(r.render_shell(ctx)));
    html_response(StatusCode::NOT_FOUND, rendered)
}

#[web::get("/")]
async fn index(req: HttpRequest, state: State) -> web::HttpResponse {
    let base_url = base_url(&req);
    let rendered = state.store.list_all()
        .map_err(io::Error::other)
        .and_then(|posts| render_page(&state, &base_url, "index.html", |r, ctx| r.render_index(&posts, ctx)));
    html_response(StatusCode::OK, rendered)
}

#[web::get("/blogs/new")]
async fn new_post_page(req: HttpRequest, state: State) -> web::HttpResponse {
    let base_url = base_url(&req);
    let rendered = render_page(&state, &base_url, "new.html", |r, ctx| Ok(r.render_shell(ctx)));
    html_response(StatusCode::OK, rendered)
}

#[web::get("/blogs/{slug}")]
async fn post_page(req: HttpRequest, slug: web::types::Path<String>, state: State) -> web::HttpResponse {
    let base_url = base_url(&req);
    let post = match state.store.get_by_slug(&slug) {
        Ok(post) => post,
        Err(StoreError::NotFound(_)) => return not_found_page(&state, &base_url),
        Err(e) => return html_response(StatusCode::INTERNAL_SERVER_ERROR, Err(io::Error::other(e))),
    };

    let rendered = render_page(&state, &base_url, "blog.html", |r, ctx| r.render_post(&post, ctx));
    html_response(StatusCode::OK, rendered)
}

#[web::get("/blogs/{slug}/edit")]
async fn edit_post_page(req: HttpRequest, slug: web::types::Path<String>, state: State) -> web::HttpResponse {
    let base_url = base_url(&req);
    let post = match state.store.get_by_slug(&slug) {
        Ok(post) => post,
        Err(StoreError::NotFound(_)) => return not_found_page(&state, &base_url),
        Err(e) => return html_response(StatusCode::INTERNAL_SERVER_ERROR, Err(io::Error::other(e))),
    };

    let rendered = render_page(&state, &base_url, "edit.html", |r, ctx| r.render_editor(&post, ctx));
    html_response(StatusCode::OK, rendered)
}

#[web::get("/sitemap.xml")]
async fn sitemap_xml(req: HttpRequest, state: State) -> web::HttpResponse {
    let base_url = base_url(&req);
    let posts = match state.store.list_all() {
        Ok(posts) => posts,
        Err(e) => {
            error!("Failed to fetch blogs for sitemap: {}", e);
            return web::HttpResponse::InternalServerError()
                .body("Failed to fetch blogs for sitemap");
        }
    };

    let sitemap = Sitemap { base_url: &base_url };
    match sitemap.render(&posts, Utc::now().date_naive()) {
        Ok(xml) => web::HttpResponse::Ok()
            .content_type("application/xml")
            .body(xml),
        Err(e) => web::HttpResponse::InternalServerError()
            .body(format!("Error generating sitemap: {}", e)),
    }
}
// End: Server side rendering region --------

#[web::get("/assets/{file_name}")]
async fn asset_files(path: web::types::Path<String>, state: State) -> Result<NamedFile, web::Error> {
    if path.contains("..") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let static_dir = static_dir(&state)?;
    Ok(NamedFile::open(static_dir.join("assets").join(path.into_inner()))?)
}

#[web::get("/robots.txt")]
async fn robots_txt(state: State) -> Result<NamedFile, web::Error> {
    let static_dir = static_dir(&state)?;
    Ok(NamedFile::open(static_dir.join("robots.txt"))?)
}

fn static_dir(state: &AppState) -> Result<&Path, web::Error> {
    match state.static_dir {
        Some(ref dir) => Ok(dir.as_path()),
        None => Err(web::error::ErrorNotFound("No frontend build available").into()),
    }
}

/// Serves `store` and, when built, the frontend until the server stops.
pub async fn server_run(config: Config, store: PostStore, frontend: Option<Frontend>) -> io::Result<()> {
    let (static_dir, assets) = match frontend {
        Some(frontend) => (Some(frontend.static_dir), frontend.assets),
        None => (None, AssetInfo::default()),
    };

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(AppState {
        store,
        template_dir: config.paths.template_dir,
        static_dir,
        assets,
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .state(web::types::JsonConfig::default().limit(MAX_JSON_BYTES))
            .service(health)
            .service(list_posts)
            .service(get_post)
            .service(create_post)
            .service(update_post)
            .service(delete_post)
            .service(index)
            .service(new_post_page)
            .service(post_page)
            .service(edit_post_page)
            .service(sitemap_xml)
            .service(asset_files)
            .service(robots_txt)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}

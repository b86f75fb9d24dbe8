use actix_web::{HttpRequest, HttpResponse, Responder, web};
use rust_embed::Embed;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, error, trace};

use crate::config::{LinkDescriptor, PageConfig, StaticConfig};
use crate::errors::{BioLinksError, Result};

// 页面模板与静态资源在编译期嵌入二进制
#[derive(Embed)]
#[folder = "assets/"]
struct PageAssets;

const INDEX_TEMPLATE: &str = "templates/index.html";

/// HTML 转义，用于把配置中的文本放进元素内容和属性值
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

fn render_links(links: &[LinkDescriptor]) -> String {
    let mut html = String::new();
    for link in links {
        let category = link
            .category
            .as_deref()
            .map(|c| format!(r#" <span class="category">{}</span>"#, escape_html(c)))
            .unwrap_or_default();
        let _ = writeln!(
            html,
            r#"            <a class="social-link" href="{url}" target="_blank" rel="noopener noreferrer" data-link-name="{name}"><i class="fa-brands {icon}"></i> <span>{name}</span>{category}</a>"#,
            url = escape_html(&link.url),
            name = escape_html(&link.name),
            icon = escape_html(&link.icon),
            category = category,
        );
    }
    html
}

/// 用配置填充页面模板
pub fn render_page(page: &PageConfig, links: &[LinkDescriptor]) -> Result<String> {
    let template = PageAssets::get(INDEX_TEMPLATE)
        .ok_or_else(|| BioLinksError::render(format!("template {} is missing", INDEX_TEMPLATE)))?;
    let template = std::str::from_utf8(&template.data)
        .map_err(|e| BioLinksError::render(format!("template is not valid UTF-8: {}", e)))?;

    let avatar = page
        .avatar_url
        .as_deref()
        .map(|url| {
            format!(
                r#"<img class="profile-avatar" src="{}" alt="{}">"#,
                escape_html(url),
                escape_html(&page.title)
            )
        })
        .unwrap_or_default();

    let title = escape_html(&page.title);
    let tagline = escape_html(&page.tagline);
    let links = render_links(links);
    Ok(fill_placeholders(
        template,
        &[
            ("PAGE_TITLE", &title),
            ("PAGE_TAGLINE", &tagline),
            ("PAGE_AVATAR", &avatar),
            ("SOCIAL_LINKS", links.trim_end()),
            ("BIOLINKS_VERSION", env!("CARGO_PKG_VERSION")),
        ],
    ))
}

/// 单遍替换 `%NAME%` 占位符，替换进来的内容不会再被展开
fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let matched = values.iter().find_map(|(key, value)| {
            after
                .strip_prefix(key)
                .and_then(|tail| tail.strip_prefix('%'))
                .map(|tail| (*value, tail))
        });
        match matched {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub struct PageService;

impl PageService {
    /// 首页：只读配置，不访问存储
    pub async fn index(config: web::Data<Arc<StaticConfig>>) -> impl Responder {
        trace!("Rendering link page");

        match render_page(&config.page, &config.links) {
            Ok(html) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(html),
            Err(e) => {
                error!("Failed to render link page: {}", e);
                HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .body("Internal Server Error")
            }
        }
    }

    /// 处理静态资源文件
    pub async fn handle_static(req: HttpRequest) -> impl Responder {
        let path = req.match_info().query("path");
        trace!("Serving static file: {}", path);

        match PageAssets::get(&format!("static/{}", path)) {
            Some(content) => HttpResponse::Ok()
                .content_type(Self::get_content_type(path))
                .append_header(("Cache-Control", "public, max-age=3600"))
                .body(content.data.into_owned()),
            None => {
                debug!("Static file not found: {}", path);
                HttpResponse::NotFound()
                    .content_type("text/plain; charset=utf-8")
                    .body("File not found")
            }
        }
    }

    /// 根据文件扩展名确定 Content-Type
    fn get_content_type(path: &str) -> &'static str {
        match path.split('.').next_back() {
            Some("css") => "text/css; charset=utf-8",
            Some("js") => "application/javascript; charset=utf-8",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("svg") => "image/svg+xml",
            Some("ico") => "image/x-icon",
            _ => "application/octet-stream",
        }
    }
}

/// 页面路由配置
pub fn page_routes() -> actix_web::Scope {
    web::scope("")
        .route("/", web::get().to(PageService::index))
        .route("/", web::head().to(PageService::index))
        .route("/static/{path:.*}", web::get().to(PageService::handle_static))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str, url: &str) -> LinkDescriptor {
        LinkDescriptor::new(name, url, "fa-github")
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_page_lists_every_link() {
        let page = PageConfig::default();
        let links = vec![
            link("GitHub", "https://github.com/johndoe"),
            link("Blog", "https://example.com/blog"),
        ];
        let html = render_page(&page, &links).unwrap();
        assert!(html.contains(r#"data-link-name="GitHub""#));
        assert!(html.contains(r#"href="https://example.com/blog""#));
        assert!(html.contains("/static/js/main.js"));
        assert!(!html.contains("%SOCIAL_LINKS%"));
    }

    #[test]
    fn test_render_page_escapes_configured_text() {
        let page = PageConfig {
            title: "<script>alert(1)</script>".to_string(),
            ..PageConfig::default()
        };
        let html = render_page(&page, &[link("a\"b", "https://example.com/?q=1&r=2")]).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"data-link-name="a&quot;b""#));
        assert!(html.contains("q=1&amp;r=2"));
    }

    #[test]
    fn test_placeholders_in_configured_text_stay_literal() {
        let page = PageConfig {
            title: "%SOCIAL_LINKS%".to_string(),
            tagline: "v%BIOLINKS_VERSION% 100%".to_string(),
            ..PageConfig::default()
        };
        let html = render_page(&page, &[link("GitHub", "https://github.com/johndoe")]).unwrap();
        assert!(html.contains("<title>%SOCIAL_LINKS%"));
        assert!(html.contains("v%BIOLINKS_VERSION% 100%"));
        assert_eq!(html.matches(r#"data-link-name="GitHub""#).count(), 1);
    }

    #[test]
    fn test_fill_placeholders_leaves_unknown_markers() {
        let out = fill_placeholders("50% %A% %B% %A", &[("A", "x")]);
        assert_eq!(out, "50% x %B% %A");
    }

    #[test]
    fn test_category_is_rendered_when_present() {
        let mut l = link("GitHub", "https://github.com/johndoe");
        l.category = Some("Code".to_string());
        let html = render_links(&[l]);
        assert!(html.contains(r#"<span class="category">Code</span>"#));
    }
}

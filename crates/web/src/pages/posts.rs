use super::fetch_failed;
use crate::html::{empty_block, encode_component, escape, href, Page};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use portal_core::constants::{POSTS_PAGINATION_RADIUS, VISITOR_COOKIE_NAME};
use portal_core::content::{image_url, PaginatedPosts, Post};
use portal_core::forms::{TrackView, VisitorId};
use portal_core::{Carousel, PageItem};
use serde::Deserialize;

const TITLE: &str = "الأخبار";

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShowParams {
    /// Gallery image opened in the lightbox.
    pub image: Option<usize>,
}

pub(crate) fn post_card(post: &Post, storage_url: &str) -> String {
    let image = post
        .gallery_images()
        .first()
        .map(|src| {
            format!(
                "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                escape(&image_url(storage_url, src)),
                escape(&post.title)
            )
        })
        .unwrap_or_default();
    let date = post
        .published_on()
        .map(|d| format!("<time datetime=\"{0}\">{0}</time>", escape(d)))
        .unwrap_or_default();
    format!(
        "<article class=\"post-card\">\n<a href=\"/posts/{slug}\">{image}<h3>{title}</h3></a>\n{date}\n</article>",
        slug = encode_component(&post.slug),
        title = escape(&post.title),
    )
}

/// Pagination bar, or nothing for a single page.
pub(crate) fn pagination(page: &PaginatedPosts) -> String {
    let Some(window) = page.page_window(POSTS_PAGINATION_RADIUS) else {
        return String::new();
    };
    let items: Vec<String> = window
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == page.current_page => {
                format!("<span class=\"page current\" aria-current=\"page\">{n}</span>")
            }
            PageItem::Page(n) => format!(
                "<a class=\"page\" href=\"{}\">{n}</a>",
                href("/posts", &[("page", n.to_string())])
            ),
            PageItem::Ellipsis => format!("<span class=\"ellipsis\">{item}</span>"),
        })
        .collect();
    format!(
        "<nav class=\"pagination\" aria-label=\"الصفحات\">\n{}\n</nav>",
        items.join("\n")
    )
}

/// `GET /posts`
pub async fn list(State(state): State<AppState>, Query(params): Query<ListParams>) -> Page {
    let requested = params.page.unwrap_or(1).max(1);
    let retry = href("/posts", &[("page", requested.to_string())]);
    let page = match state.api.posts(requested).await {
        Ok(page) => page,
        Err(e) => return fetch_failed(TITLE, &e, &retry),
    };

    let cards = if page.data.is_empty() {
        empty_block("لا توجد منشورات.")
    } else {
        let storage = state.config.storage_url();
        let cards: Vec<String> = page.data.iter().map(|p| post_card(p, storage)).collect();
        format!("<div class=\"posts\">\n{}\n</div>", cards.join("\n"))
    };

    let body = format!("<h1>{TITLE}</h1>\n{cards}\n{}", pagination(&page));
    Page::new(TITLE, body)
}

fn visitor_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == VISITOR_COOKIE_NAME)
        .map(|(_, value)| value.to_string())
}

fn gallery(post: &Post, slug_href: &str, storage_url: &str, open: Option<usize>) -> String {
    let images = post.gallery_images();
    if images.is_empty() {
        return String::new();
    }
    let thumbs: Vec<String> = images
        .iter()
        .enumerate()
        .map(|(i, src)| {
            format!(
                "<a href=\"{slug_href}?image={i}\"><img src=\"{}\" alt=\"\" loading=\"lazy\"></a>",
                escape(&image_url(storage_url, src))
            )
        })
        .collect();

    let lightbox = match open {
        Some(start) if start < images.len() => {
            let mut carousel = Carousel::starting_at(images.len(), start);
            let current = carousel.index();
            let mut back = carousel;
            let next = carousel.next();
            let prev = back.prev();
            format!(
                "<div class=\"lightbox\" role=\"dialog\">\n<img src=\"{src}\" alt=\"\">\n\
                 <a class=\"prev\" href=\"{slug_href}?image={prev}\">السابق</a>\n\
                 <span class=\"counter\">{pos} / {len}</span>\n\
                 <a class=\"next\" href=\"{slug_href}?image={next}\">التالي</a>\n\
                 <a class=\"close\" href=\"{slug_href}\">إغلاق</a>\n</div>",
                src = escape(&image_url(storage_url, images[current])),
                pos = current + 1,
                len = images.len(),
            )
        }
        _ => String::new(),
    };

    format!(
        "<div class=\"gallery\">\n{}\n</div>\n{lightbox}",
        thumbs.join("\n")
    )
}

/// `GET /posts/{slug}`
///
/// Fetches the post and its related posts, and records one view for the visitor. A missing
/// visitor cookie is minted and set on the response. Tracking failures are logged only.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ShowParams>,
    headers: HeaderMap,
) -> Response {
    let slug_href = format!("/posts/{}", encode_component(&slug));
    let (post, related) = tokio::join!(state.api.post(&slug), state.api.related_posts(&slug));
    let post = match post {
        Ok(post) => post,
        Err(e) => return fetch_failed(TITLE, &e, &slug_href).into_response(),
    };

    let cookie = visitor_cookie(&headers);
    let (visitor, fresh) = VisitorId::from_cookie(cookie.as_deref());
    if let Err(e) = state.api.track_view(&TrackView::new(&slug, &visitor)).await {
        tracing::warn!("track view for {slug} failed: {e}");
    }

    let storage = state.config.storage_url();
    let related = match related {
        Ok(items) if !items.is_empty() => {
            let cards: Vec<String> = items.iter().map(|p| post_card(p, storage)).collect();
            format!(
                "<section class=\"related\">\n<h2>منشورات ذات صلة</h2>\n{}\n</section>",
                cards.join("\n")
            )
        }
        Ok(_) => String::new(),
        Err(e) => {
            tracing::warn!("related posts for {slug} failed: {e}");
            String::new()
        }
    };

    let tags: String = post
        .tags
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| format!("<span class=\"tag\">{}</span>", escape(t)))
        .collect();
    let date = post
        .published_on()
        .map(|d| format!("<time datetime=\"{0}\">{0}</time>", escape(d)))
        .unwrap_or_default();

    // Post bodies are authored HTML from the CMS and are rendered as-is.
    let body = format!(
        "<article class=\"post\">\n<h1>{title}</h1>\n{date}\n<div class=\"tags\">{tags}</div>\n\
         {gallery}\n<div class=\"content\">{content}</div>\n</article>\n{related}",
        title = escape(&post.title),
        gallery = gallery(&post, &slug_href, storage, params.image),
        content = post.content,
    );

    let mut response = Page::new(&post.title, body).into_response();
    if fresh {
        let cookie = format!(
            "{VISITOR_COOKIE_NAME}={}; Path=/; Max-Age=31536000; SameSite=Lax",
            visitor.as_str()
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(current: u32, last: u32) -> PaginatedPosts {
        PaginatedPosts {
            current_page: current,
            data: Vec::new(),
            last_page: last,
            per_page: 10,
            total: 0,
            next_page_url: None,
            prev_page_url: None,
        }
    }

    #[test]
    fn pagination_hidden_for_single_page() {
        assert_eq!(pagination(&page(1, 1)), "");
    }

    #[test]
    fn pagination_marks_current_and_gaps() {
        let html = pagination(&page(5, 10));
        assert!(html.contains("<span class=\"page current\" aria-current=\"page\">5</span>"));
        assert!(html.contains("href=\"/posts?page=4\""));
        assert!(html.contains("href=\"/posts?page=10\""));
        assert_eq!(html.matches("class=\"ellipsis\"").count(), 2);
    }

    #[test]
    fn reads_visitor_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; portal_uid=abc"),
        );
        assert_eq!(visitor_cookie(&headers).as_deref(), Some("abc"));
        assert_eq!(visitor_cookie(&HeaderMap::new()), None);
    }
}

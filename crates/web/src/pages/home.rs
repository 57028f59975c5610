use super::posts::{pagination, post_card};
use crate::html::{empty_block, error_block, escape, href, Page};
use crate::AppState;
use axum::extract::{Query, State};
use portal_client::{next_page_param, ClientResult};
use portal_core::content::{
    image_url, ticker_titles, visible_slides, Announcement, Awareness, PaginatedPosts, Slide,
    SlideLink, Stats,
};
use portal_core::{Carousel, ViewState};
use serde::Deserialize;

const TITLE: &str = "الهيئة الصحية";

#[derive(Debug, Default, Deserialize)]
pub struct HomeParams {
    /// Slider position.
    pub slide: Option<usize>,
}

fn ticker(state: &ViewState<Vec<Announcement>>) -> String {
    match state {
        ViewState::Ready(items) => {
            let titles = ticker_titles(items);
            if titles.is_empty() {
                return String::new();
            }
            let spans: Vec<String> = titles
                .iter()
                .map(|t| format!("<span class=\"item\">{}</span>", escape(t)))
                .collect();
            format!(
                "<div class=\"ticker\" role=\"marquee\"><strong>إعلانات</strong> {}</div>",
                spans.join(" • ")
            )
        }
        ViewState::Failed { .. } => {
            "<div class=\"ticker muted\">تعذر تحميل الإعلانات</div>".to_string()
        }
        ViewState::Loading => String::new(),
    }
}

/// Hero slider. Hidden on failure or when no slide has an image.
fn slider(state: &ViewState<Vec<Slide>>, start: usize, storage_url: &str) -> String {
    let Some(slides) = state.as_ready() else {
        return String::new();
    };
    let slides = visible_slides(slides);
    if slides.is_empty() {
        return String::new();
    }

    let carousel = Carousel::starting_at(slides.len(), start);
    let slide = slides[carousel.index()];
    let image = format!(
        "<img src=\"{}\" alt=\"\">",
        escape(&image_url(storage_url, slide.image.as_deref().unwrap_or("")))
    );
    let framed = match slide.href() {
        Some(SlideLink::Internal(path)) => format!("<a href=\"{}\">{image}</a>", escape(&path)),
        Some(SlideLink::External(url)) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{image}</a>",
            escape(&url)
        ),
        None => image,
    };

    let (mut next, mut prev) = (carousel, carousel);
    let dots: Vec<String> = (0..slides.len())
        .map(|i| {
            let current = if i == carousel.index() { " current" } else { "" };
            format!(
                "<a class=\"dot{current}\" href=\"{}\" aria-label=\"{}\"></a>",
                href("/", &[("slide", i.to_string())]),
                i + 1
            )
        })
        .collect();

    format!(
        "<section class=\"slider\" data-index=\"{index}\" data-count=\"{count}\">\n{framed}\n\
         <a class=\"prev\" href=\"{prev}\">السابق</a>\n<a class=\"next\" href=\"{next}\">التالي</a>\n\
         <div class=\"dots\">{dots}</div>\n</section>",
        index = carousel.index(),
        count = carousel.len(),
        prev = href("/", &[("slide", prev.prev().to_string())]),
        next = href("/", &[("slide", next.next().to_string())]),
        dots = dots.join(""),
    )
}

fn stats(state: &ViewState<Stats>) -> String {
    match state {
        ViewState::Ready(stats) => {
            let cards: Vec<String> = stats
                .cards()
                .iter()
                .map(|c| {
                    format!(
                        "<div class=\"stat\" data-key=\"{}\"><strong>{}</strong><h3>{}</h3><p>{}</p></div>",
                        c.key, c.value, c.title, c.description
                    )
                })
                .collect();
            format!(
                "<section class=\"stats\">\n<h2>إحصائيات النظام</h2>\n{}\n</section>",
                cards.join("\n")
            )
        }
        ViewState::Failed { message } => format!(
            "<section class=\"stats\">\n<h2>إحصائيات النظام</h2>\n{}\n</section>",
            error_block(message, "/")
        ),
        ViewState::Loading => String::new(),
    }
}

fn awareness(state: &ViewState<Vec<Awareness>>) -> String {
    match state.as_ready() {
        Some(items) if !items.is_empty() => {
            let links: Vec<String> = items
                .iter()
                .map(|a| {
                    format!(
                        "<li><a href=\"/awareness/{}\">{}</a></li>",
                        a.id,
                        escape(&a.title)
                    )
                })
                .collect();
            format!(
                "<section class=\"awareness\">\n<h2>التوعية الصحية</h2>\n<ul>\n{}\n</ul>\n</section>",
                links.join("\n")
            )
        }
        _ => String::new(),
    }
}

fn latest_posts(state: &ViewState<PaginatedPosts>, storage_url: &str) -> String {
    let inner = match state {
        ViewState::Ready(page) if page.data.is_empty() => empty_block("لا توجد منشورات."),
        ViewState::Ready(page) => {
            let cards: Vec<String> = page.data.iter().map(|p| post_card(p, storage_url)).collect();
            let more = next_page_param(page.next_page_url.as_deref())
                .map(|n| {
                    format!(
                        "<a class=\"more\" href=\"{}\">المزيد</a>",
                        href("/posts", &[("page", n.to_string())])
                    )
                })
                .unwrap_or_default();
            format!(
                "<div class=\"posts\">\n{}\n</div>\n{}\n{more}",
                cards.join("\n"),
                pagination(page)
            )
        }
        ViewState::Failed { .. } => error_block(
            "حدث خطأ أثناء تحميل المنشورات. يرجى المحاولة لاحقًا.",
            "/",
        ),
        ViewState::Loading => String::new(),
    };
    format!("<section class=\"latest\">\n<h2>آخر الأخبار</h2>\n{inner}\n</section>")
}

/// Log a failed fetch and turn the result into the section's view state.
fn view<T>(what: &str, result: ClientResult<T>) -> ViewState<T> {
    if let Err(e) = &result {
        tracing::warn!("home {what} failed: {e}");
    }
    ViewState::from_result(result.map_err(|e| e.user_message()))
}

/// `GET /`
pub async fn index(State(state): State<AppState>, Query(params): Query<HomeParams>) -> Page {
    let api = &state.api;
    let (announcements, slides, stats_res, awareness_res, posts) = tokio::join!(
        api.announcements(),
        api.slides(),
        api.stats(),
        api.awareness_list(),
        api.posts(1),
    );

    let storage = state.config.storage_url();
    let body = [
        ticker(&view("announcements", announcements)),
        slider(&view("slides", slides), params.slide.unwrap_or(0), storage),
        stats(&view("stats", stats_res)),
        latest_posts(&view("posts", posts), storage),
        awareness(&view("awareness", awareness_res)),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("\n");

    Page::new(TITLE, body)
}

//! Awareness campaigns, FAQs, contact details, and the static settings pages.

use super::fetch_failed;
use crate::html::{empty_block, escape, href, Page};
use crate::AppState;
use axum::extract::{Path, Query, State};
use portal_core::content::{
    faq_anchor, filter_faqs, image_url, ContactKind, SettingsKind,
};
use serde::Deserialize;

/// `GET /awareness/{id}`
pub async fn awareness(State(state): State<AppState>, Path(id): Path<u64>) -> Page {
    let retry = format!("/awareness/{id}");
    let item = match state.api.awareness(id).await {
        Ok(item) => item,
        Err(e) => return fetch_failed("التوعية الصحية", &e, &retry),
    };

    let storage = state.config.storage_url();
    let attachments: Vec<String> = item
        .attachments
        .iter()
        .map(|a| {
            let image = a
                .image
                .as_deref()
                .filter(|i| !i.trim().is_empty())
                .map(|i| {
                    format!(
                        "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                        escape(&image_url(storage, i)),
                        escape(&a.title)
                    )
                })
                .unwrap_or_default();
            format!(
                "<article class=\"attachment\">\n{image}\n<h2>{}</h2>\n<div class=\"content\">{}</div>\n</article>",
                escape(&a.title),
                a.content.as_deref().unwrap_or("")
            )
        })
        .collect();

    let body = format!(
        "<h1>{}</h1>\n<div class=\"description\">{}</div>\n{}",
        escape(&item.title),
        item.description.as_deref().unwrap_or(""),
        attachments.join("\n")
    );
    Page::new(&item.title, body)
}

#[derive(Debug, Default, Deserialize)]
pub struct FaqParams {
    pub q: Option<String>,
}

/// `GET /faqs`
pub async fn faqs(State(state): State<AppState>, Query(params): Query<FaqParams>) -> Page {
    const TITLE: &str = "الأسئلة الشائعة";
    let query = params.q.unwrap_or_default();
    let settings = match state.api.faqs().await {
        Ok(settings) => settings,
        Err(e) => return fetch_failed(TITLE, &e, &href("/faqs", &[("q", query.clone())])),
    };

    let title = settings
        .faqs_title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(TITLE);
    let matches = filter_faqs(&settings.faq, &query);
    let list = if matches.is_empty() {
        empty_block("لا توجد أسئلة مطابقة.")
    } else {
        let items: Vec<String> = matches
            .iter()
            .map(|f| {
                format!(
                    "<details id=\"{anchor}\">\n<summary>{q}</summary>\n<div class=\"answer\">{a}</div>\n</details>",
                    anchor = escape(&faq_anchor(&f.question)),
                    q = escape(&f.question),
                    a = f.answer,
                )
            })
            .collect();
        items.join("\n")
    };

    let body = format!(
        "<h1>{}</h1>\n<div class=\"intro\">{}</div>\n\
         <form method=\"get\" action=\"/faqs\" role=\"search\">\n\
         <input type=\"search\" name=\"q\" value=\"{}\" placeholder=\"ابحث في الأسئلة\">\n</form>\n\
         <p class=\"count\">{} سؤال</p>\n{list}",
        escape(title),
        settings.faqs_content.as_deref().unwrap_or(""),
        escape(&query),
        matches.len(),
    );
    Page::new(title, body)
}

/// `GET /contact`
pub async fn contact(State(state): State<AppState>) -> Page {
    const TITLE: &str = "تواصل معنا";
    let contacts = match state.api.contacts().await {
        Ok(contacts) => contacts,
        Err(e) => return fetch_failed(TITLE, &e, "/contact"),
    };

    let list = if contacts.is_empty() {
        empty_block("لا توجد بيانات اتصال متاحة حالياً.")
    } else {
        let items: Vec<String> = contacts
            .iter()
            .map(|c| {
                let value = c.value.as_deref().unwrap_or("");
                let label = match c.kind {
                    ContactKind::Email => "البريد الإلكتروني",
                    ContactKind::Phone => "الهاتف",
                };
                let shown = match c.link() {
                    Some(link) => format!(
                        "<a dir=\"ltr\" href=\"{}\">{}</a>",
                        escape(&link),
                        escape(value)
                    ),
                    None => format!("<span dir=\"ltr\">{}</span>", escape(value)),
                };
                let extra: String = [c.name.as_deref(), c.time_period.as_deref(), c.zone.as_deref()]
                    .into_iter()
                    .flatten()
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| format!("<span class=\"meta\">{}</span>", escape(s)))
                    .collect();
                format!("<li class=\"contact\"><strong>{label}</strong> {shown} {extra}</li>")
            })
            .collect();
        format!("<ul class=\"contacts\">\n{}\n</ul>", items.join("\n"))
    };

    Page::new(TITLE, format!("<h1>{TITLE}</h1>\n{list}"))
}

async fn settings_page(state: &AppState, kind: SettingsKind, path: &str) -> Page {
    let page = match state.api.settings(kind).await {
        Ok(page) => page,
        Err(e) => return fetch_failed(kind.fallback_title(), &e, path),
    };
    let title = page.title.as_deref().unwrap_or(kind.fallback_title());
    let content = match page.content.as_deref() {
        Some(html) => format!("<div class=\"content\">{html}</div>"),
        None => empty_block("لا يوجد محتوى متاح حالياً."),
    };
    Page::new(title, format!("<h1>{}</h1>\n{content}", escape(title)))
}

/// `GET /about`
pub async fn about(State(state): State<AppState>) -> Page {
    settings_page(&state, SettingsKind::About, "/about").await
}

/// `GET /terms`
pub async fn terms(State(state): State<AppState>) -> Page {
    settings_page(&state, SettingsKind::Terms, "/terms").await
}

/// `GET /privacy`
pub async fn privacy(State(state): State<AppState>) -> Page {
    settings_page(&state, SettingsKind::Privacy, "/privacy").await
}

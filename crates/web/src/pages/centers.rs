use super::fetch_failed;
use crate::html::{empty_block, escape, field, href, Page};
use crate::AppState;
use axum::extract::{Query, State};
use portal_core::content::{center_cities, filter_centers, map_points, Center};
use portal_core::schedule::evaluate;
use serde::Deserialize;

const TITLE: &str = "خريطة المراكز";

#[derive(Debug, Default, Deserialize)]
pub struct MapParams {
    pub city: Option<String>,
    pub q: Option<String>,
}

fn center_card(center: &Center, now: chrono::NaiveDateTime) -> String {
    let status = evaluate(&center.schedules, now);
    let badge = if status.open {
        "<span class=\"badge open\">مفتوح الآن</span>"
    } else {
        "<span class=\"badge closed\">مغلق الآن</span>"
    };
    let hours = if status.today_ranges.is_empty() {
        "<p class=\"hours\">لا توجد مواعيد عمل اليوم</p>".to_string()
    } else {
        let ranges: Vec<String> = status
            .today_ranges
            .iter()
            .map(|r| format!("<span dir=\"ltr\">{}</span>", escape(r)))
            .collect();
        format!("<p class=\"hours\">مواعيد اليوم: {}</p>", ranges.join("، "))
    };
    format!(
        "<li class=\"center\" id=\"center-{id}\">\n<h3>{name}</h3> {badge}\n{address}{city}{phone}{alt}{hours}\n</li>",
        id = center.id,
        name = escape(&center.name),
        address = field("العنوان", center.address_line()),
        city = field("المدينة", center.city.as_deref()),
        phone = field("الهاتف", center.phone.as_deref()),
        alt = field("هاتف بديل", center.alt_phone.as_deref()),
    )
}

/// `GET /map`
pub async fn map(State(state): State<AppState>, Query(params): Query<MapParams>) -> Page {
    let city = params
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let query = params.q.clone().unwrap_or_default();
    let retry = href(
        "/map",
        &[("city", city.unwrap_or("").to_string()), ("q", query.clone())],
    );

    let centers = match state.api.centers().await {
        Ok(centers) => centers,
        Err(e) => return fetch_failed(TITLE, &e, &retry),
    };

    let now = (state.clock)();
    let visible = filter_centers(&centers, city, &query);
    let points = serde_json::to_string(&map_points(&visible)).unwrap_or_else(|_| "[]".into());

    let options: String = std::iter::once(format!(
        "<option value=\"\"{}>كل المدن</option>",
        if city.is_none() { " selected" } else { "" }
    ))
    .chain(center_cities(&centers).into_iter().map(|c| {
        format!(
            "<option value=\"{0}\"{1}>{0}</option>",
            escape(c),
            if Some(c) == city { " selected" } else { "" }
        )
    }))
    .collect();

    let list = if visible.is_empty() {
        empty_block("لا توجد مراكز مطابقة.")
    } else {
        let cards: Vec<String> = visible.iter().map(|c| center_card(c, now)).collect();
        format!("<ul class=\"centers\">\n{}\n</ul>", cards.join("\n"))
    };

    let body = format!(
        "<h1>{TITLE}</h1>\n<form method=\"get\" action=\"/map\">\n\
         <select name=\"city\">{options}</select>\n\
         <input type=\"search\" name=\"q\" value=\"{q}\" placeholder=\"ابحث باسم المركز أو العنوان أو الهاتف\">\n\
         <button type=\"submit\">بحث</button>\n</form>\n\
         <p class=\"count\">{count} مركز</p>\n\
         <div id=\"map\" data-points=\"{points}\"></div>\n{list}",
        q = escape(&query),
        count = visible.len(),
        points = escape(&points),
    );
    Page::new(TITLE, body)
}

//! Organisational structure explorer.
//!
//! The browser's URL fragment and clipboard are replaced by request-backed ports: the `unit`
//! query parameter is read as the `unit-<id>` fragment, and fragment writes and clipboard
//! copies are captured into the rendered links. Expansion state travels in the `open`
//! parameter as a comma-separated id list.

use super::fetch_failed;
use crate::html::{empty_block, encode_component, escape, field, href, Page};
use crate::{ApiErrorRes, AppState};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use portal_core::structure::{
    highlight_range, path_to, unit_fragment, ClipboardPort, NavigationPort, Navigator, OrgUnit,
    PortError, TreeRow, UnitId,
};
use serde::Deserialize;

const TITLE: &str = "الهيكل التنظيمي";

#[derive(Debug, Default, Clone, Deserialize)]
pub struct StructureParams {
    pub q: Option<String>,
    pub unit: Option<String>,
    pub expand: Option<String>,
    pub toggle: Option<String>,
    pub open: Option<String>,
}

impl StructureParams {
    fn raw_query(&self) -> String {
        self.q.clone().unwrap_or_default()
    }

    fn unit_id(&self) -> Option<UnitId> {
        non_blank(self.unit.as_deref()).map(UnitId::new)
    }

    fn toggle_id(&self) -> Option<UnitId> {
        non_blank(self.toggle.as_deref()).map(UnitId::new)
    }

    fn open_ids(&self) -> Vec<UnitId> {
        self.open
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter_map(|id| non_blank(Some(id)))
            .map(UnitId::new)
            .collect()
    }

    fn self_href(&self) -> String {
        href(
            "/structure",
            &[
                ("q", self.raw_query()),
                ("unit", self.unit.clone().unwrap_or_default()),
                ("open", self.open.clone().unwrap_or_default()),
            ],
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Navigation port backed by the request: reads `?unit=` and records fragment writes.
#[derive(Debug, Default)]
pub(crate) struct RequestNavigation {
    requested: Option<String>,
    written: Option<String>,
}

impl RequestNavigation {
    pub(crate) fn from_unit(unit: Option<&UnitId>) -> Self {
        Self {
            requested: unit.map(unit_fragment),
            written: None,
        }
    }

    /// Fragment written during this request, if any.
    pub(crate) fn written(&self) -> Option<&str> {
        self.written.as_deref()
    }
}

impl NavigationPort for RequestNavigation {
    fn fragment(&self) -> Option<String> {
        self.written.clone().or_else(|| self.requested.clone())
    }

    fn replace_fragment(&mut self, fragment: &str) -> Result<(), PortError> {
        self.written = Some(fragment.to_string());
        Ok(())
    }
}

/// Clipboard stand-in: the copied text becomes the page's copy button payload.
#[derive(Debug, Default)]
struct CopyButton(Option<String>);

impl ClipboardPort for CopyButton {
    fn write_text(&mut self, text: &str) -> Result<(), PortError> {
        self.0 = Some(text.to_string());
        Ok(())
    }
}

/// Apply the request's parameters to a fresh navigator.
///
/// A `toggle` or `expand` request replaces the expansion set with `open` plus the operation,
/// so ancestors of the selection can be collapsed. Any other request is a selection: `open`
/// is merged with the path to `unit`, and the fragment is written.
pub(crate) fn navigator(
    forest: Vec<OrgUnit>,
    params: &StructureParams,
) -> Navigator<RequestNavigation> {
    let unit = params.unit_id();
    let mut nav = Navigator::new(forest, RequestNavigation::from_unit(unit.as_ref()));
    let toggle = params.toggle_id();
    let expand = non_blank(params.expand.as_deref());

    let restore = |nav: &mut Navigator<RequestNavigation>| {
        for id in params.open_ids() {
            if !nav.is_expanded(&id) {
                nav.toggle(&id);
            }
        }
    };

    if toggle.is_some() || expand.is_some() {
        nav.collapse_all();
        restore(&mut nav);
        match expand {
            Some("all") => nav.expand_all(),
            Some("none") => nav.collapse_all(),
            _ => {}
        }
        if let Some(id) = toggle {
            nav.toggle(&id);
        }
    } else {
        restore(&mut nav);
        if let Some(id) = unit {
            if nav.select(&id).is_none() {
                tracing::debug!("deep link to unknown unit {id}");
            }
        }
    }

    if let Some(q) = params.q.as_deref() {
        nav.set_query(q);
    }
    nav
}

struct Links<'a> {
    q: String,
    open: String,
    selected: Option<&'a UnitId>,
}

impl<'a> Links<'a> {
    fn new(nav: &'a Navigator<RequestNavigation>, params: &StructureParams) -> Self {
        let open = nav
            .expanded()
            .iter()
            .map(UnitId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        Self {
            q: params.raw_query(),
            open,
            selected: nav.selected_id(),
        }
    }

    fn selected(&self) -> String {
        self.selected.map(|id| id.to_string()).unwrap_or_default()
    }

    fn select(&self, id: &UnitId) -> String {
        let base = href(
            "/structure",
            &[
                ("q", self.q.clone()),
                ("unit", id.to_string()),
                ("open", self.open.clone()),
            ],
        );
        format!("{base}#{}", encode_component(&unit_fragment(id)))
    }

    fn toggle(&self, id: &UnitId) -> String {
        href(
            "/structure",
            &[
                ("q", self.q.clone()),
                ("unit", self.selected()),
                ("open", self.open.clone()),
                ("toggle", id.to_string()),
            ],
        )
    }

    fn expand(&self, mode: &str) -> String {
        href(
            "/structure",
            &[
                ("q", self.q.clone()),
                ("unit", self.selected()),
                ("expand", mode.to_string()),
            ],
        )
    }
}

fn highlighted_name(row: &TreeRow<'_>, nav: &Navigator<RequestNavigation>) -> String {
    let name = &row.unit.name;
    match highlight_range(name, nav.query()) {
        Some(range) => format!(
            "{}<mark>{}</mark>{}",
            escape(&name[..range.start]),
            escape(&name[range.clone()]),
            escape(&name[range.end..])
        ),
        None => escape(name),
    }
}

fn render_row(row: &TreeRow<'_>, nav: &Navigator<RequestNavigation>, links: &Links<'_>) -> String {
    let unit = row.unit;
    let toggle = if unit.has_children() {
        let (glyph, label) = if row.expanded {
            ("▾", "طي")
        } else {
            ("◂", "توسيع")
        };
        format!(
            "<a class=\"toggle\" href=\"{}\" aria-label=\"{label}\">{glyph}</a>",
            links.toggle(&unit.id)
        )
    } else {
        "<span class=\"leaf\"></span>".to_string()
    };
    format!(
        "<li id=\"{fragment}\" class=\"row{selected}\" style=\"padding-inline-start:{indent}rem\">\
         {toggle}<a class=\"select\" href=\"{select}\"><span class=\"icon icon-{icon}\"></span> {name}</a> \
         <span class=\"badge\">{label}</span></li>",
        fragment = escape(&unit_fragment(&unit.id)),
        selected = if row.selected { " selected" } else { "" },
        indent = row.depth as f32 * 1.25,
        select = links.select(&unit.id),
        icon = unit.kind.icon(),
        name = highlighted_name(row, nav),
        label = unit.kind.label(),
    )
}

fn render_details(
    nav: &Navigator<RequestNavigation>,
    site_url: &str,
    links: &Links<'_>,
) -> String {
    let Some(unit) = nav.selected() else {
        return empty_block("اختر عنصراً من الشجرة لعرض التفاصيل.");
    };

    let trail = path_to(nav.forest(), &unit.id)
        .iter()
        .map(|u| {
            format!(
                "<a href=\"{}\">{}</a>",
                links.select(&u.id),
                escape(&u.name)
            )
        })
        .collect::<Vec<_>>()
        .join(" / ");

    let page_url = format!(
        "{site_url}/structure?unit={}",
        encode_component(unit.id.as_str())
    );
    let mut copy = CopyButton::default();
    let copy_link = nav
        .copy_deep_link(&page_url, &mut copy)
        .and(copy.0)
        .map(|link| {
            format!(
                "<a class=\"copy-link\" href=\"{0}\" data-clipboard=\"{0}\">نسخ الرابط</a>",
                escape(&link)
            )
        })
        .unwrap_or_default();

    let mut out = format!(
        "<nav class=\"trail\">{trail}</nav>\n<h2>{}</h2>\n<span class=\"badge\">{}</span>\n{copy_link}\n",
        escape(&unit.name),
        unit.kind.label()
    );
    out.push_str(&field("الهاتف", unit.phone.as_deref()));
    if let Some(email) = unit.email.as_deref().filter(|e| !e.trim().is_empty()) {
        out.push_str(&format!(
            "<p class=\"field\"><span>البريد</span> <a dir=\"ltr\" href=\"mailto:{0}\">{0}</a></p>",
            escape(email)
        ));
    }
    out.push_str(&field("العنوان", unit.address.as_deref()));

    out.push_str(&format!(
        "<section class=\"employees\">\n<h3>الموظفون <span class=\"badge\">{}</span></h3>\n",
        unit.employees.len()
    ));
    if unit.employees.is_empty() {
        out.push_str(&empty_block("لا يوجد موظفون مسجلون."));
    } else {
        out.push_str("<ul>\n");
        for e in &unit.employees {
            out.push_str(&format!(
                "<li><strong>{}</strong>{}{}{}</li>\n",
                escape(&e.name),
                field("", e.position.as_deref()),
                field("الهاتف", e.phone.as_deref()),
                field("البريد", e.email.as_deref()),
            ));
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</section>");
    out
}

/// `GET /structure`
pub async fn page(State(state): State<AppState>, Query(params): Query<StructureParams>) -> Page {
    let forest = match state.api.structures().await {
        Ok(forest) => forest,
        Err(e) => return fetch_failed(TITLE, &e, &params.self_href()),
    };

    let nav = navigator(forest, &params);
    let links = Links::new(&nav, &params);

    let rows = nav.visible_rows();
    let tree = if rows.is_empty() {
        empty_block("لا توجد نتائج مطابقة.")
    } else {
        let items: String = rows
            .iter()
            .map(|row| render_row(row, &nav, &links))
            .collect::<Vec<_>>()
            .join("\n");
        format!("<ul class=\"tree\">\n{items}\n</ul>")
    };

    let anchor = nav
        .navigation()
        .written()
        .map(|f| format!(" data-fragment=\"{}\"", escape(f)))
        .unwrap_or_default();

    let body = format!(
        "<section class=\"structure\"{anchor}>\n<header>\n<h1>{TITLE}</h1>\n\
         <p>عرض هرمي للهيئة والإدارات والمراكز مع الموظفين وبيانات الاتصال.</p>\n\
         <a class=\"button\" href=\"{expand_all}\">فتح الكل</a>\n\
         <a class=\"button\" href=\"{collapse_all}\">إغلاق الكل</a>\n\
         <a class=\"button\" href=\"/structure.json\" download>تنزيل JSON</a>\n</header>\n\
         <form method=\"get\" action=\"/structure\" role=\"search\">\n\
         <input type=\"search\" name=\"q\" value=\"{q}\" aria-label=\"بحث\" \
         placeholder=\"ابحث بالاسم أو النوع أو الموظفين أو الهاتف/العنوان\">\n\
         <input type=\"hidden\" name=\"unit\" value=\"{unit}\">\n\
         <input type=\"hidden\" name=\"open\" value=\"{open}\">\n</form>\n\
         <div class=\"grid\">\n<div class=\"card\">\n<h2>الشجرة التنظيمية</h2>\n{tree}\n</div>\n\
         <div class=\"card details\">\n<h2>تفاصيل الجهة المختارة</h2>\n{details}\n</div>\n</div>\n</section>",
        expand_all = links.expand("all"),
        collapse_all = links.expand("none"),
        q = escape(&links.q),
        unit = escape(&links.selected()),
        open = escape(&links.open),
        details = render_details(&nav, state.config.site_url(), &links),
    );

    Page::new(TITLE, body)
}

/// `GET /structure.json`: the canonical forest as a pretty-printed attachment.
pub async fn download(State(state): State<AppState>) -> Response {
    let forest = match state.api.structures().await {
        Ok(forest) => forest,
        Err(e) => {
            tracing::error!("Fetch structures error: {:?}", e);
            return (
                StatusCode::BAD_GATEWAY,
                Json(ApiErrorRes {
                    message: e.user_message(),
                }),
            )
                .into_response();
        }
    };

    match serde_json::to_string_pretty(&forest) {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"structure.json\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Serialise structure error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

//! HTML building blocks shared by every page: escaping, the site layout, and inline blocks.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

pub fn escape(value: &str) -> String {
    v_htmlescape::escape(value).to_string()
}

/// Percent-encode a value for use inside a query string.
pub fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// `path?k=v&...` with empty values left out.
pub fn href(path: &str, params: &[(&str, String)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}={}", encode_component(v)))
        .collect();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", query.join("&"))
    }
}

const NAV: [(&str, &str); 8] = [
    ("/", "الرئيسية"),
    ("/structure", "الهيكل التنظيمي"),
    ("/map", "خريطة المراكز"),
    ("/posts", "الأخبار"),
    ("/faqs", "الأسئلة الشائعة"),
    ("/contact", "تواصل معنا"),
    ("/complaint", "تقديم شكوى"),
    ("/about", "من نحن"),
];

/// A full page inside the site chrome.
pub struct Page {
    title: String,
    body: String,
    status: StatusCode,
}

impl Page {
    pub fn new(title: &str, body: String) -> Self {
        Self {
            title: title.to_string(),
            body,
            status: StatusCode::OK,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn render(&self) -> String {
        let nav: String = NAV
            .iter()
            .map(|(path, label)| format!("<a href=\"{path}\">{label}</a>"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "<!DOCTYPE html>\n<html lang=\"ar\" dir=\"rtl\">\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{title}</title>\n</head>\n<body>\n<header class=\"site-nav\">\n<nav>\n{nav}\n</nav>\n</header>\n\
             <main>\n{body}\n</main>\n<footer>\n<a href=\"/terms\">شروط الاستخدام</a>\n\
             <a href=\"/privacy\">سياسة الخصوصية</a>\n</footer>\n</body>\n</html>\n",
            title = escape(&self.title),
            body = self.body,
        )
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        (self.status, Html(self.render())).into_response()
    }
}

/// Inline failure block with a retry link.
pub fn error_block(message: &str, retry_href: &str) -> String {
    format!(
        "<div class=\"alert error\" role=\"alert\">\n<p>{}</p>\n\
         <a class=\"retry\" href=\"{}\">إعادة المحاولة</a>\n</div>",
        escape(message),
        escape(retry_href)
    )
}

pub fn empty_block(message: &str) -> String {
    format!("<div class=\"empty\">{}</div>", escape(message))
}

/// Labelled value, or nothing when the value is blank or absent.
pub fn field(label: &str, value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => format!(
            "<p class=\"field\"><span>{}</span> <span dir=\"ltr\">{}</span></p>",
            escape(label),
            escape(v)
        ),
        None => String::new(),
    }
}

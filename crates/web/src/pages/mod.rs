//! Route handlers, one module per area of the site.

pub mod api;
pub mod centers;
pub mod complaint;
pub mod home;
pub mod info;
pub mod posts;
pub mod structure;

use crate::html::{error_block, Page};
use axum::http::StatusCode;
use portal_client::ClientError;

/// Page shown when the main resource of a page could not be fetched.
pub(crate) fn fetch_failed(title: &str, err: &ClientError, retry_href: &str) -> Page {
    tracing::warn!("{title}: {err}");
    let status = match err.status() {
        Some(404) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    };
    let body = format!(
        "<h1>{}</h1>\n{}",
        crate::html::escape(title),
        error_block(&err.user_message(), retry_href)
    );
    Page::new(title, body).with_status(status)
}

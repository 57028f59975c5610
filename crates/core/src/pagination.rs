//! Compact page-number window for paginated listings.

/// One entry of a pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

impl serde::Serialize for PageItem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            PageItem::Page(n) => serializer.serialize_u32(*n),
            PageItem::Ellipsis => serializer.serialize_str(ELLIPSIS),
        }
    }
}

/// Marker rendered for a gap in the page sequence.
pub const ELLIPSIS: &str = "…";

impl std::fmt::Display for PageItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{n}"),
            PageItem::Ellipsis => f.write_str(ELLIPSIS),
        }
    }
}

/// Build the page window around `current`.
///
/// The window `[current - radius, current + radius]` is clamped to `[1, last]`. Page 1 and page
/// `last` are always present; an ellipsis marks a gap between them and the window. `current` is
/// clamped into range and `last` is treated as at least 1, so the result is never empty.
///
/// Callers hide pagination entirely when `last <= 1`.
pub fn build_page_window(current: u32, last: u32, radius: u32) -> Vec<PageItem> {
    let last = last.max(1);
    let current = current.clamp(1, last);
    let start = current.saturating_sub(radius).max(1);
    let end = current.saturating_add(radius).min(last);

    let mut pages = Vec::with_capacity((end - start + 5) as usize);
    if start > 1 {
        pages.push(PageItem::Page(1));
        if start > 2 {
            pages.push(PageItem::Ellipsis);
        }
    }
    pages.extend((start..=end).map(PageItem::Page));
    if end < last {
        if end < last - 1 {
            pages.push(PageItem::Ellipsis);
        }
        pages.push(PageItem::Page(last));
    }
    pages
}

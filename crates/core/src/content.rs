//! Content records fetched from the API and rendered mostly as-is.
//!
//! Each record type has a "required display field"; items missing it are skipped rather than
//! rendered half-empty. Centers, FAQs, and contacts also carry the small client-side filters
//! the site applies to them.

use crate::pagination::{build_page_window, PageItem};
use crate::schedule::Schedule;
use portal_types::looks_like_email;
use serde::{Deserialize, Serialize};

// ============================================================================
// Announcements, slides, posts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Titles shown by the announcement ticker, in source order, blanks skipped.
pub fn ticker_titles(items: &[Announcement]) -> Vec<&str> {
    items
        .iter()
        .map(|a| a.title.trim())
        .filter(|t| !t.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub other_images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Post {
    /// Main image followed by the other images, blanks dropped.
    pub fn gallery_images(&self) -> Vec<&str> {
        self.main_image
            .iter()
            .chain(self.other_images.iter())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Calendar date part of `created_at` (`2024-05-01T10:00:00Z` → `2024-05-01`).
    pub fn published_on(&self) -> Option<&str> {
        let created = self.created_at.as_deref()?.trim();
        let date = created.split(['T', ' ']).next()?;
        (!date.is_empty()).then_some(date)
    }
}

/// Laravel paginator page of posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedPosts {
    pub current_page: u32,
    #[serde(default)]
    pub data: Vec<Post>,
    pub last_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub next_page_url: Option<String>,
    #[serde(default)]
    pub prev_page_url: Option<String>,
}

impl PaginatedPosts {
    /// Pagination is only shown when there is more than one page.
    pub fn has_pagination(&self) -> bool {
        self.last_page > 1
    }

    /// Page window for the pagination bar, or `None` when it is hidden.
    pub fn page_window(&self, radius: u32) -> Option<Vec<PageItem>> {
        self.has_pagination()
            .then(|| build_page_window(self.current_page, self.last_page, radius))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    Image,
    Post,
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    #[serde(rename = "type")]
    pub kind: SlideKind,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub post_id: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub post: Option<Post>,
}

/// Where a slide links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideLink {
    Internal(String),
    External(String),
}

impl Slide {
    /// Link target: external URL slides open the URL, post slides open the post page (by
    /// slug, falling back to the post id), image slides are not links.
    pub fn href(&self) -> Option<SlideLink> {
        match self.kind {
            SlideKind::Url => self
                .url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .map(|u| SlideLink::External(u.to_string())),
            SlideKind::Post => {
                let target = self
                    .post
                    .as_ref()
                    .map(|p| p.slug.clone())
                    .filter(|s| !s.is_empty())
                    .or_else(|| self.post_id.map(|id| id.to_string()))?;
                Some(SlideLink::Internal(format!("/posts/{target}")))
            }
            SlideKind::Image => None,
        }
    }
}

/// Slides that have an image, in source order.
pub fn visible_slides(slides: &[Slide]) -> Vec<&Slide> {
    slides
        .iter()
        .filter(|s| s.image.as_deref().is_some_and(|i| !i.trim().is_empty()))
        .collect()
}

/// Resolve an API image path against the storage origin. Absolute URLs pass through.
pub fn image_url(storage_url: &str, path: &str) -> String {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        storage_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// ============================================================================
// Awareness, stats, static settings pages
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Awareness {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub centers: Option<u64>,
    #[serde(default)]
    pub users: Option<u64>,
    #[serde(default)]
    pub patients: Option<u64>,
    #[serde(default)]
    pub appointments: Option<u64>,
    #[serde(default)]
    pub doctors: Option<u64>,
    #[serde(default)]
    pub orders: Option<u64>,
}

/// One counter card of the statistics panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub value: u64,
}

impl Stats {
    /// Cards in display order; missing counters show as zero.
    pub fn cards(&self) -> Vec<StatCard> {
        let card = |key: &'static str,
                    title: &'static str,
                    description: &'static str,
                    value: Option<u64>| StatCard {
            key,
            title,
            description,
            value: value.unwrap_or(0),
        };
        vec![
            card(
                "patients",
                "عدد المستفيدين",
                "عدد المستفيدين من الخدمات الصحية",
                self.patients,
            ),
            card(
                "centers",
                "المراكز الصحية",
                "عدد المراكز التابعة للهيئة",
                self.centers,
            ),
            card("users", "الموظفون", "عدد الموظفين في النظام", self.users),
            card(
                "appointments",
                "المواعيد",
                "عدد المواعيد المجدولة",
                self.appointments,
            ),
            card("doctors", "الأطباء", "عدد الأطباء المسجلين", self.doctors),
            card("orders", "الطلبات", "عدد طلبات الخدمات", self.orders),
        ]
    }
}

/// Static settings pages served from `/settings/{key}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsKind {
    About,
    Terms,
    Privacy,
}

impl SettingsKind {
    /// Path segment under `/settings/`.
    pub fn endpoint(self) -> &'static str {
        match self {
            SettingsKind::About => "about",
            SettingsKind::Terms => "terms",
            SettingsKind::Privacy => "privacy-policy",
        }
    }

    /// Body field prefix, e.g. `about` for `about_title` / `about_content`.
    fn field_prefix(self) -> &'static str {
        match self {
            SettingsKind::About => "about",
            SettingsKind::Terms => "terms_of_service",
            SettingsKind::Privacy => "privacy_policy",
        }
    }

    pub fn fallback_title(self) -> &'static str {
        match self {
            SettingsKind::About => "من نحن",
            SettingsKind::Terms => "شروط الاستخدام",
            SettingsKind::Privacy => "سياسة الخصوصية",
        }
    }
}

/// Title and HTML body of a settings page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingsPage {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl SettingsPage {
    /// Pick `<prefix>_title` / `<prefix>_content` out of a settings response.
    pub fn from_value(kind: SettingsKind, value: &serde_json::Value) -> Self {
        let field = |suffix: &str| {
            value
                .get(format!("{}_{}", kind.field_prefix(), suffix))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
                .filter(|s| !s.trim().is_empty())
        };
        Self {
            title: field("title"),
            content: field("content"),
        }
    }
}

// ============================================================================
// FAQs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqSettings {
    #[serde(default)]
    pub faqs_title: Option<String>,
    #[serde(default)]
    pub faqs_content: Option<String>,
    #[serde(default)]
    pub faq: Vec<Faq>,
}

/// FAQs whose question or answer contains `query` (trimmed, case-insensitive).
pub fn filter_faqs<'a>(items: &'a [Faq], query: &str) -> Vec<&'a Faq> {
    let q = query.trim().to_lowercase();
    items
        .iter()
        .filter(|f| {
            q.is_empty()
                || f.question.to_lowercase().contains(&q)
                || f.answer.to_lowercase().contains(&q)
        })
        .collect()
}

/// Anchor id for a FAQ question.
///
/// Lowercases, drops everything except word characters, Arabic letters, whitespace and `-`,
/// trims, then joins whitespace runs with `-`.
pub fn faq_anchor(question: &str) -> String {
    let kept: String = question
        .to_lowercase()
        .chars()
        .filter(|&c| {
            c.is_ascii_alphanumeric()
                || c == '_'
                || c == '-'
                || c.is_whitespace()
                || ('\u{0600}'..='\u{06FF}').contains(&c)
        })
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

// ============================================================================
// Contact
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Email,
    Phone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "type")]
    pub kind: ContactKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub time_period: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
}

impl Contact {
    /// `mailto:`/`tel:` link for a well-formed value.
    pub fn link(&self) -> Option<String> {
        let value = self.value.as_deref()?.trim();
        match self.kind {
            ContactKind::Email if looks_like_email(value) => Some(format!("mailto:{value}")),
            ContactKind::Phone if looks_like_phone(value) => {
                let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
                Some(format!("tel:{compact}"))
            }
            _ => None,
        }
    }
}

fn looks_like_phone(value: &str) -> bool {
    value.chars().count() >= 6
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '(' | ')' | '-' | ' '))
}

/// Decode `{ contact: [...] }`, skip entries without a known type or a value, and order
/// e-mail entries before phone entries (stable within each kind).
pub fn contacts_from_value(value: &serde_json::Value) -> Vec<Contact> {
    let items = value
        .get("contact")
        .and_then(serde_json::Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut contacts: Vec<Contact> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Contact>(item).ok())
        .filter(|c| c.value.as_deref().is_some_and(|v| !v.trim().is_empty()))
        .collect();
    contacts.sort_by_key(|c| c.kind);
    contacts
}

// ============================================================================
// Centers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub alt_phone: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

impl Center {
    /// Address line for the map popup: address, else street.
    pub fn address_line(&self) -> Option<&str> {
        self.address
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .or(self.street.as_deref())
            .filter(|a| !a.trim().is_empty())
    }

    /// `(latitude, longitude)` when both are present and finite.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }

    fn haystack(&self) -> String {
        [
            Some(self.name.as_str()),
            self.address.as_deref(),
            self.street.as_deref(),
            self.city.as_deref(),
            self.phone.as_deref(),
            self.alt_phone.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }
}

/// Distinct non-empty cities in first-seen order.
pub fn center_cities(centers: &[Center]) -> Vec<&str> {
    let mut cities: Vec<&str> = Vec::new();
    for city in centers.iter().filter_map(|c| c.city.as_deref()) {
        if !city.trim().is_empty() && !cities.contains(&city) {
            cities.push(city);
        }
    }
    cities
}

/// Centers in `city` (all when `None`) whose text fields contain `query`.
pub fn filter_centers<'a>(
    centers: &'a [Center],
    city: Option<&str>,
    query: &str,
) -> Vec<&'a Center> {
    let term = query.trim().to_lowercase();
    centers
        .iter()
        .filter(|c| city.map_or(true, |wanted| c.city.as_deref().unwrap_or("") == wanted))
        .filter(|c| term.is_empty() || c.haystack().contains(&term))
        .collect()
}

/// Map markers for the centers that have coordinates.
pub fn map_points(centers: &[&Center]) -> Vec<(f64, f64)> {
    centers.iter().filter_map(|c| c.position()).collect()
}

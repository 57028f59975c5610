//! # Portal Client
//!
//! Async client for the health authority REST API.
//!
//! Handles:
//! - Typed GET/POST calls over `reqwest` with JSON bodies
//! - Request timeouts from [`PortalConfig`]
//! - Decode failures reported with the failing field path
//!
//! The web layer depends on the [`SiteApi`] trait rather than on [`PortalClient`] directly, so
//! handlers can be exercised against an in-process stub.

mod error;

pub use error::{ClientError, ClientResult};

use async_trait::async_trait;
use portal_core::content::{
    contacts_from_value, Announcement, Awareness, Center, Contact, FaqSettings, PaginatedPosts,
    Post, SettingsKind, SettingsPage, Slide, Stats,
};
use portal_core::forms::{ComplaintPayload, TrackView};
use portal_core::structure::{forest_from_value, OrgUnit};
use portal_core::PortalConfig;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Remote API operations used by the site.
#[async_trait]
pub trait SiteApi: Send + Sync + 'static {
    /// Organisational structure as a canonical, sorted forest.
    async fn structures(&self) -> ClientResult<Vec<OrgUnit>>;
    async fn centers(&self) -> ClientResult<Vec<Center>>;
    async fn posts(&self, page: u32) -> ClientResult<PaginatedPosts>;
    async fn post(&self, slug: &str) -> ClientResult<Post>;
    async fn related_posts(&self, slug: &str) -> ClientResult<Vec<Post>>;
    async fn track_view(&self, view: &TrackView) -> ClientResult<()>;
    async fn submit_complaint(&self, complaint: &ComplaintPayload) -> ClientResult<()>;
    async fn announcements(&self) -> ClientResult<Vec<Announcement>>;
    async fn slides(&self) -> ClientResult<Vec<Slide>>;
    async fn awareness_list(&self) -> ClientResult<Vec<Awareness>>;
    async fn awareness(&self, id: u64) -> ClientResult<Awareness>;
    async fn stats(&self) -> ClientResult<Stats>;
    async fn settings(&self, kind: SettingsKind) -> ClientResult<SettingsPage>;
    async fn faqs(&self) -> ClientResult<FaqSettings>;
    /// Contact entries, sanitised and ordered e-mail first.
    async fn contacts(&self) -> ClientResult<Vec<Contact>>;
}

/// `reqwest`-backed [`SiteApi`].
#[derive(Clone, Debug)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PortalClient {
    /// Build a client for `config.api_base_url()` with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if the base URL cannot be parsed and
    /// `ClientError::Request` if the HTTP client cannot be constructed.
    pub fn new(config: &PortalConfig) -> ClientResult<Self> {
        let base_url = Url::parse(config.api_base_url())
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", config.api_base_url())))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.api_base_url().to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.api_timeout())
            .build()
            .map_err(|source| ClientError::Request {
                endpoint: "client".into(),
                source,
            })?;

        Ok(Self { http, base_url })
    }

    /// `<base>/<segments...>`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_bytes(&self, endpoint: &str, url: Url) -> ClientResult<Vec<u8>> {
        tracing::debug!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| ClientError::Request {
                endpoint: endpoint.into(),
                source,
            })?;
        read_body(endpoint, resp).await
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, url: Url) -> ClientResult<T> {
        let body = self.get_bytes(endpoint, url).await?;
        decode(endpoint, &body)
    }

    async fn get_list<T: DeserializeOwned>(&self, endpoint: &str, url: Url) -> ClientResult<Vec<T>> {
        let items: Vec<Value> = self.get_json(endpoint, url).await?;
        Ok(decode_items(endpoint, items))
    }

    async fn post_json<B: Serialize + Sync>(&self, endpoint: &str, body: &B) -> ClientResult<()> {
        let url = self.url(&[endpoint.trim_start_matches('/')])?;
        tracing::debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Request {
                endpoint: endpoint.into(),
                source,
            })?;
        read_body(endpoint, resp).await.map(|_| ())
    }
}

async fn read_body(endpoint: &str, resp: reqwest::Response) -> ClientResult<Vec<u8>> {
    let status = resp.status();
    let body = resp.bytes().await.map_err(|source| ClientError::Request {
        endpoint: endpoint.into(),
        source,
    })?;
    if !status.is_success() {
        return Err(ClientError::Status {
            endpoint: endpoint.into(),
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    Ok(body.to_vec())
}

/// Non-blank `message` field of a JSON error body.
fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
}

/// Decode a JSON body, reporting the path of the first mismatching field.
fn decode<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> ClientResult<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        ClientError::Decode {
            endpoint: endpoint.into(),
            path,
            message: err.into_inner().to_string(),
        }
    })
}

/// Decode list elements one by one; elements missing required fields are skipped.
fn decode_items<T: DeserializeOwned>(endpoint: &str, items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("skipping {endpoint}[{index}]: {err}");
                None
            }
        })
        .collect()
}

/// `page` query parameter of a Laravel paginator `next_page_url`.
///
/// Relative links resolve against a placeholder origin; only the query matters. The first
/// `page` pair wins.
pub fn next_page_param(next_page_url: Option<&str>) -> Option<u32> {
    let base = Url::parse("http://localhost/").ok()?;
    let url = base.join(next_page_url?).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.trim().parse().ok())
}

#[async_trait]
impl SiteApi for PortalClient {
    async fn structures(&self) -> ClientResult<Vec<OrgUnit>> {
        let value: Value = self.get_json("/structures", self.url(&["structures"])?).await?;
        Ok(forest_from_value(&value)?)
    }

    async fn centers(&self) -> ClientResult<Vec<Center>> {
        self.get_list("/centers/guest", self.url(&["centers", "guest"])?)
            .await
    }

    async fn posts(&self, page: u32) -> ClientResult<PaginatedPosts> {
        let mut url = self.url(&["posts"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.max(1).to_string());
        self.get_json("/posts", url).await
    }

    async fn post(&self, slug: &str) -> ClientResult<Post> {
        self.get_json("/posts/{slug}", self.url(&["posts", slug])?)
            .await
    }

    async fn related_posts(&self, slug: &str) -> ClientResult<Vec<Post>> {
        self.get_list("/posts/{slug}/related", self.url(&["posts", slug, "related"])?)
            .await
    }

    async fn track_view(&self, view: &TrackView) -> ClientResult<()> {
        self.post_json("/track-view", view).await
    }

    async fn submit_complaint(&self, complaint: &ComplaintPayload) -> ClientResult<()> {
        self.post_json("/complaints", complaint).await
    }

    async fn announcements(&self) -> ClientResult<Vec<Announcement>> {
        self.get_list("/announcements", self.url(&["announcements"])?)
            .await
    }

    async fn slides(&self) -> ClientResult<Vec<Slide>> {
        self.get_list("/sliders", self.url(&["sliders"])?).await
    }

    async fn awareness_list(&self) -> ClientResult<Vec<Awareness>> {
        self.get_list("/awareness", self.url(&["awareness"])?).await
    }

    async fn awareness(&self, id: u64) -> ClientResult<Awareness> {
        let id = id.to_string();
        self.get_json("/awareness/{id}", self.url(&["awareness", &id])?)
            .await
    }

    async fn stats(&self) -> ClientResult<Stats> {
        self.get_json("/stats", self.url(&["stats"])?).await
    }

    async fn settings(&self, kind: SettingsKind) -> ClientResult<SettingsPage> {
        let value: Value = self
            .get_json("/settings", self.url(&["settings", kind.endpoint()])?)
            .await?;
        Ok(SettingsPage::from_value(kind, &value))
    }

    async fn faqs(&self) -> ClientResult<FaqSettings> {
        self.get_json("/settings/faq", self.url(&["settings", "faq"])?)
            .await
    }

    async fn contacts(&self) -> ClientResult<Vec<Contact>> {
        let value: Value = self
            .get_json("/settings/contact", self.url(&["settings", "contact"])?)
            .await?;
        Ok(contacts_from_value(&value))
    }
}

use super::*;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use portal_client::{ClientError, ClientResult};
use portal_core::content::{
    Announcement, Awareness, Center, Contact, FaqSettings, PaginatedPosts, Post, SettingsKind,
    SettingsPage, Slide, Stats,
};
use portal_core::forms::{ComplaintPayload, TrackView};
use portal_core::schedule::Schedule;
use portal_core::structure::{build_forest, OrgUnit, UnitType};
use std::sync::Mutex;
use tower::ServiceExt;

#[derive(Default)]
struct StubApi {
    offline: bool,
    complaints: Mutex<Vec<ComplaintPayload>>,
    views: Mutex<Vec<TrackView>>,
}

impl StubApi {
    fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn guard(&self, endpoint: &str) -> ClientResult<()> {
        if self.offline {
            return Err(ClientError::Status {
                endpoint: endpoint.into(),
                status: 503,
                message: None,
            });
        }
        Ok(())
    }
}

fn post(id: u64, slug: &str) -> Post {
    Post {
        id,
        title: format!("Post {id}"),
        slug: slug.into(),
        content: "<p>Body</p>".into(),
        main_image: Some("posts/main.jpg".into()),
        other_images: Vec::new(),
        tags: vec!["news".into()],
        created_at: Some("2024-06-01T09:00:00.000000Z".into()),
        updated_at: None,
    }
}

fn center(id: u64, name: &str, city: &str, schedules: Vec<Schedule>) -> Center {
    Center {
        id,
        name: name.into(),
        phone: Some("0912345678".into()),
        alt_phone: None,
        street: None,
        address: Some("Main street".into()),
        city: Some(city.into()),
        latitude: Some(32.88),
        longitude: Some(13.19),
        schedules,
    }
}

#[async_trait]
impl SiteApi for StubApi {
    async fn structures(&self) -> ClientResult<Vec<OrgUnit>> {
        self.guard("/structures")?;
        Ok(build_forest(&[
            OrgUnit::new(1u64, "Authority", UnitType::Authority),
            OrgUnit::new(2u64, "Planning", UnitType::Directorate).with_parent(1u64),
            OrgUnit::new(3u64, "Statistics", UnitType::Department).with_parent(2u64),
            OrgUnit::new(4u64, "Finance", UnitType::Directorate).with_parent(1u64),
        ]))
    }

    async fn centers(&self) -> ClientResult<Vec<Center>> {
        self.guard("/centers/guest")?;
        Ok(vec![
            center(
                1,
                "Central Clinic",
                "Tripoli",
                vec![Schedule::new("Sunday", "08:00", "14:00", true)],
            ),
            center(2, "North Clinic", "Misrata", Vec::new()),
        ])
    }

    async fn posts(&self, page: u32) -> ClientResult<PaginatedPosts> {
        self.guard("/posts")?;
        Ok(PaginatedPosts {
            current_page: page,
            data: vec![post(page as u64, &format!("post-{page}"))],
            last_page: 3,
            per_page: 1,
            total: 3,
            next_page_url: (page < 3).then(|| format!("http://api.test/posts?page={}", page + 1)),
            prev_page_url: None,
        })
    }

    async fn post(&self, slug: &str) -> ClientResult<Post> {
        self.guard("/posts/{slug}")?;
        if slug == "missing" {
            return Err(ClientError::Status {
                endpoint: "/posts/{slug}".into(),
                status: 404,
                message: None,
            });
        }
        Ok(post(7, slug))
    }

    async fn related_posts(&self, _slug: &str) -> ClientResult<Vec<Post>> {
        self.guard("/posts/{slug}/related")?;
        Ok(vec![post(8, "related-one")])
    }

    async fn track_view(&self, view: &TrackView) -> ClientResult<()> {
        self.guard("/track-view")?;
        self.views.lock().unwrap().push(view.clone());
        Ok(())
    }

    async fn submit_complaint(&self, complaint: &ComplaintPayload) -> ClientResult<()> {
        self.guard("/complaints")?;
        self.complaints.lock().unwrap().push(complaint.clone());
        Ok(())
    }

    async fn announcements(&self) -> ClientResult<Vec<Announcement>> {
        self.guard("/announcements")?;
        Ok(vec![Announcement {
            id: 1,
            title: "Vaccination week".into(),
            content: None,
            images: Vec::new(),
            created_at: None,
            updated_at: None,
        }])
    }

    async fn slides(&self) -> ClientResult<Vec<Slide>> {
        self.guard("/sliders")?;
        Ok(Vec::new())
    }

    async fn awareness_list(&self) -> ClientResult<Vec<Awareness>> {
        self.guard("/awareness")?;
        Ok(Vec::new())
    }

    async fn awareness(&self, id: u64) -> ClientResult<Awareness> {
        self.guard("/awareness/{id}")?;
        Ok(Awareness {
            id,
            title: "Hand washing".into(),
            description: Some("<p>Wash often.</p>".into()),
            attachments: Vec::new(),
        })
    }

    async fn stats(&self) -> ClientResult<Stats> {
        self.guard("/stats")?;
        Ok(Stats {
            centers: Some(12),
            ..Stats::default()
        })
    }

    async fn settings(&self, kind: SettingsKind) -> ClientResult<SettingsPage> {
        self.guard("/settings")?;
        Ok(SettingsPage {
            title: None,
            content: Some(format!("<p>{}</p>", kind.endpoint())),
        })
    }

    async fn faqs(&self) -> ClientResult<FaqSettings> {
        self.guard("/settings/faq")?;
        Ok(FaqSettings::default())
    }

    async fn contacts(&self) -> ClientResult<Vec<Contact>> {
        self.guard("/settings/contact")?;
        Ok(Vec::new())
    }
}

// 2024-06-02 was a Sunday.
fn sunday_at(hour: u32) -> Clock {
    Arc::new(move || {
        NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    })
}

fn app_with(api: Arc<StubApi>) -> Router {
    let state = AppState::new(api, Arc::new(PortalConfig::local())).with_clock(sunday_at(10));
    router(state)
}

fn app() -> Router {
    app_with(Arc::new(StubApi::default()))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

fn complaint(body: &'static str) -> Request<Body> {
    Request::post("/complaint")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_reports_alive() {
    let (status, _, body) = get(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["message"], "Portal is alive");
}

#[tokio::test]
async fn api_structure_filters_and_keeps_ancestors() {
    let (status, _, body) = get(app(), "/api/structure?q=%20Statis%20").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["query"], "statis");
    assert_eq!(json["total"], 3);
    assert_eq!(json["units"][0]["id"], 1);
    assert_eq!(json["units"][0]["children"][0]["name"], "Planning");
}

#[tokio::test]
async fn api_structure_unfiltered_counts_every_unit() {
    let (_, _, body) = get(app(), "/api/structure").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["total"], 4);
    assert!(json["query"].is_null());
}

#[tokio::test]
async fn api_structure_is_bad_gateway_when_offline() {
    let (status, _, body) = get(app_with(Arc::new(StubApi::offline())), "/api/structure").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(!json["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn structure_deep_link_selects_and_reveals_unit() {
    let (status, _, body) = get(app(), "/structure?unit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("id=\"unit-3\" class=\"row selected\""));
    assert!(body.contains("data-fragment=\"unit-3\""));
    assert!(body.contains("<h2>Statistics</h2>"));
    // Finance sits directly under the expanded root.
    assert!(body.contains("id=\"unit-4\""));
}

#[tokio::test]
async fn structure_fetch_failure_shows_retry() {
    let (status, _, body) = get(app_with(Arc::new(StubApi::offline())), "/structure").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("class=\"alert error\""));
    assert!(body.contains("إعادة المحاولة"));
}

#[tokio::test]
async fn structure_download_is_a_json_attachment() {
    let (status, headers, body) = get(app(), "/structure.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("structure.json"));
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn map_marks_open_and_closed_centers() {
    let (status, _, body) = get(app(), "/map").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<p class=\"count\">2 مركز</p>"));
    assert_eq!(body.matches("مفتوح الآن").count(), 1);
    assert_eq!(body.matches("مغلق الآن").count(), 1);
    assert!(body.contains("08:00"));
}

#[tokio::test]
async fn map_filters_by_city() {
    let (_, _, body) = get(app(), "/map?city=Misrata").await;
    assert!(body.contains("<p class=\"count\">1 مركز</p>"));
    assert!(body.contains("North Clinic"));
    assert!(!body.contains("Central Clinic</h3>"));
}

#[tokio::test]
async fn posts_list_paginates() {
    let (status, _, body) = get(app(), "/posts?page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("aria-current=\"page\">2</span>"));
    assert!(body.contains("href=\"/posts?page=3\""));
    assert!(body.contains("Post 2"));
}

#[tokio::test]
async fn post_page_mints_visitor_cookie_and_tracks_view() {
    let api = Arc::new(StubApi::default());
    let (status, headers, body) = get(app_with(api.clone()), "/posts/hello").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("منشورات ذات صلة"));

    let cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("portal_uid="));
    let views = api.views.lock().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].slug, "hello");
    assert!(cookie.contains(&views[0].uid));
}

#[tokio::test]
async fn post_page_reuses_existing_visitor() {
    let api = Arc::new(StubApi::default());
    let req = Request::get("/posts/hello")
        .header(header::COOKIE, "portal_uid=6f9619ff-8b86-4d01-b42d-00cf4fc964ff")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(app_with(api.clone()), req).await;
    assert!(headers.get(header::SET_COOKIE).is_none());
    assert_eq!(
        api.views.lock().unwrap()[0].uid,
        "6f9619ff-8b86-4d01-b42d-00cf4fc964ff"
    );
}

#[tokio::test]
async fn missing_post_is_not_found() {
    let (status, _, body) = get(app(), "/posts/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("المحتوى المطلوب غير موجود."));
}

#[tokio::test]
async fn home_renders_sections_and_hides_empty_slider() {
    let (status, _, body) = get(app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Vaccination week"));
    assert!(body.contains("data-key=\"centers\""));
    assert!(!body.contains("class=\"slider\""));
    assert!(body.contains("href=\"/posts?page=2\""));
}

#[tokio::test]
async fn settings_pages_use_fallback_titles() {
    let (status, _, body) = get(app(), "/privacy").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(SettingsKind::Privacy.fallback_title()));
}

#[tokio::test]
async fn complaint_with_errors_is_rerendered() {
    let api = Arc::new(StubApi::default());
    let (status, _, body) = send(
        app_with(api.clone()),
        complaint("name=Ali&phone=12ab&message=short"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("id=\"phone-error\""));
    assert!(body.contains("id=\"message-error\""));
    assert!(body.contains("value=\"Ali\""));
    assert!(api.complaints.lock().unwrap().is_empty());
}

#[tokio::test]
async fn valid_complaint_is_sent() {
    let api = Arc::new(StubApi::default());
    let (status, _, body) = send(
        app_with(api.clone()),
        complaint("name=&phone=0912345678&message=The+clinic+was+closed+during+hours"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("alert success"));

    let sent = api.complaints.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].name, None);
    assert_eq!(sent[0].phone.as_deref(), Some("0912345678"));
    assert_eq!(sent[0].message, "The clinic was closed during hours");
}

#[tokio::test]
async fn honeypot_complaint_looks_sent_but_is_dropped() {
    let api = Arc::new(StubApi::default());
    let (status, _, body) = send(
        app_with(api.clone()),
        complaint("message=This+is+long+enough+text&hp_company=Spam+Inc"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("alert success"));
    assert!(api.complaints.lock().unwrap().is_empty());
}

#[tokio::test]
async fn complaint_api_failure_keeps_input() {
    let (status, _, body) = send(
        app_with(Arc::new(StubApi::offline())),
        complaint("message=This+is+long+enough+text"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("This is long enough text"));
    assert!(body.contains("role=\"alert\""));
}

#[tokio::test]
async fn openapi_document_lists_json_endpoints() {
    let (status, _, body) = get(app(), "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["paths"]["/health"].is_object());
    assert!(json["paths"]["/api/structure"].is_object());
}

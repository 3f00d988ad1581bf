//! End-to-end tests against the router with in-memory backends.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dairy_cms_api::config::AppConfig;
use dairy_cms_api::state::AppState;
use dairy_cms_core::auth::StaticAuth;
use dairy_cms_core::storage::MemoryStorage;
use dairy_cms_core::store::{
    CollectionStore, Filter, ListQuery, MemoryStore, StoreError, StoreResult,
};
use dairy_cms_core::Row;
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

const ADMIN_EMAIL: &str = "admin@farm.test";
const ADMIN_PASSWORD: &str = "correct horse";

/// Memory store that can be told to drop its next read.
#[derive(Clone)]
struct FlakyStore {
    inner: MemoryStore,
    fail_list: Arc<AtomicBool>,
    fail_get: Arc<AtomicBool>,
}

impl FlakyStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_list: Arc::default(),
            fail_get: Arc::default(),
        }
    }

    fn fail_next_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    fn fail_next_get(&self) {
        self.fail_get.store(true, Ordering::SeqCst);
    }

    fn tripped(flag: &AtomicBool) -> StoreResult<()> {
        if flag.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Transport("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CollectionStore for FlakyStore {
    async fn list(&self, table: &str, query: &ListQuery) -> StoreResult<Vec<Row>> {
        Self::tripped(&self.fail_list)?;
        self.inner.list(table, query).await
    }

    async fn get_one(&self, table: &str, id: &str) -> StoreResult<Row> {
        Self::tripped(&self.fail_get)?;
        self.inner.get_one(table, id).await
    }

    async fn find_one(&self, table: &str, filters: &[Filter]) -> StoreResult<Row> {
        self.inner.find_one(table, filters).await
    }

    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> StoreResult<Row> {
        self.inner.update(table, id, patch).await
    }

    async fn remove(&self, table: &str, id: &str) -> StoreResult<()> {
        self.inner.remove(table, id).await
    }

    async fn set_single_active(&self, table: &str, column: &str, id: &str) -> StoreResult<()> {
        self.inner.set_single_active(table, column, id).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }
}

struct TestApp {
    base: String,
    http: reqwest::Client,
    store: MemoryStore,
    flaky: FlakyStore,
    storage: MemoryStorage,
}

impl TestApp {
    async fn spawn() -> Self {
        let store = MemoryStore::new();
        let flaky = FlakyStore::new(store.clone());
        let storage = MemoryStorage::new("https://cdn.test/uploads");
        let auth = StaticAuth::new()
            .with_account(ADMIN_EMAIL, ADMIN_PASSWORD)
            .unwrap();
        let state = AppState::new(
            Arc::new(flaky.clone()),
            Arc::new(storage.clone()),
            Arc::new(auth),
            AppConfig::default(),
        );
        let app = dairy_cms_api::build_app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            http: reqwest::Client::new(),
            store,
            flaky,
            storage,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self.http.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn login(&self) -> String {
        let response = self
            .http
            .post(self.url("/v1/admin/login"))
            .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self.http.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }
}

fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}

fn faq_values(question: &str) -> Value {
    json!({
        "question_en": question,
        "question_ar": "كيف أحفظ الحليب؟",
        "question_fr": "Comment conserver le lait ?",
        "answer_en": "Keep it refrigerated below 4°C.",
        "answer_ar": "احفظه في الثلاجة دون 4 درجات.",
        "answer_fr": "Gardez-le au réfrigérateur sous 4°C.",
    })
}

#[tokio::test]
async fn ping_and_health() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get("/v1/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], json!("memory"));
}

#[tokio::test]
async fn empty_collections_render_empty_state() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get("/v1/site/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"]["state"], json!("empty"));
    assert_eq!(body["items"]["message"], json!("No products to show yet."));
    assert_eq!(body["toasts"], json!([]));

    let (_, body) = app.get("/v1/site/discount").await;
    assert_eq!(body["discount"], Value::Null);
    assert_eq!(body["show_flyer"], json!(false));
}

#[tokio::test]
async fn unknown_paths_are_json_404() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get("/no/such/page?lang=fr").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], json!("notFound"));
    assert_eq!(body["error"]["message"], json!("Page introuvable."));
}

#[tokio::test]
async fn localized_fields_fall_back_to_english() {
    let app = TestApp::spawn().await;
    app.store
        .seed(
            "products",
            vec![row(json!({
                "id": "p1",
                "name_en": "Milk", "name_ar": "", "name_fr": "Lait",
                "description_en": "Fresh whole milk.",
            }))],
        )
        .await;

    let (_, body) = app.get("/v1/site/products?lang=ar").await;
    assert_eq!(body["dir"], json!("rtl"));
    assert_eq!(body["items"]["cards"][0]["title"], json!("Milk"));

    let response = app
        .http
        .get(app.url("/v1/site/products/p1"))
        .header(header::COOKIE, "lang=fr")
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["lang"], json!("fr"));
    assert_eq!(body["title"], json!("Lait"));
}

#[tokio::test]
async fn hidden_recipes_stay_off_the_site() {
    let app = TestApp::spawn().await;
    app.store
        .seed(
            "recipes",
            vec![
                row(json!({ "id": "r1", "title_en": "Ayran", "show_in_gallery": true })),
                row(json!({ "id": "r2", "title_en": "Draft", "show_in_gallery": false })),
            ],
        )
        .await;

    let (_, body) = app.get("/v1/site/recipes").await;
    let cards = body["items"]["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["title"], json!("Ayran"));

    let (status, body) = app.get("/v1/site/recipes/r2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["state"], json!("not_found"));
}

#[tokio::test]
async fn admin_routes_require_a_session() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get("/v1/admin/products").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["redirect"], json!("/admin/login"));

    let response = app
        .http
        .post(app.url("/v1/admin/login"))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .admin(reqwest::Method::GET, "/v1/admin/products", "forged", None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_cookie_opens_the_admin() {
    let app = TestApp::spawn().await;
    let response = app
        .http
        .post(app.url("/v1/admin/login"))
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("admin_session="));
    assert!(cookie.contains("HttpOnly"));
    let pair = cookie.split(';').next().unwrap().to_string();

    let response = app
        .http
        .get(app.url("/v1/admin"))
        .header(header::COOKIE, &pair)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["admin"], json!(ADMIN_EMAIL));
    assert_eq!(body["counts"]["products"], json!(0));

    let response = app
        .http
        .post(app.url("/v1/admin/logout"))
        .header(header::COOKIE, &pair)
        .send()
        .await
        .unwrap();
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert!(cleared.starts_with("admin_session="));
}

#[tokio::test]
async fn new_faq_items_default_to_next_order_index() {
    let app = TestApp::spawn().await;
    let token = app.login().await;

    let (_, form) = app
        .admin(reqwest::Method::GET, "/v1/admin/faq/new", &token, None)
        .await;
    assert_eq!(form["form"]["mode"], json!("add"));
    assert_eq!(form["values"]["order_index"], json!(0));

    let (status, body) = app
        .admin(
            reqwest::Method::POST,
            "/v1/admin/faq",
            &token,
            Some(json!({ "values": faq_values("How should I store milk?") })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["row"]["order_index"], json!(0));
    assert_eq!(body["toasts"][0]["level"], json!("success"));
    assert_eq!(body["toasts"][0]["message"], json!("FAQ item created successfully"));

    let (_, body) = app
        .admin(
            reqwest::Method::POST,
            "/v1/admin/faq",
            &token,
            Some(json!({ "values": faq_values("Is your milk pasteurized?") })),
        )
        .await;
    assert_eq!(body["row"]["order_index"], json!(1));
    assert_eq!(app.store.rows("faq_items").await.len(), 2);
}

#[tokio::test]
async fn invalid_submissions_keep_the_form() {
    let app = TestApp::spawn().await;
    let token = app.login().await;
    let values = json!({
        "name_en": "M",
        "name_ar": "حليب",
        "name_fr": "Lait",
        "description_en": "Fresh whole milk from the farm.",
        "description_ar": "حليب كامل طازج من المزرعة.",
        "description_fr": "Lait entier frais de la ferme.",
        "image_url": "not a url",
    });
    let (status, body) = app
        .admin(
            reqwest::Method::POST,
            "/v1/admin/products",
            &token,
            Some(json!({ "values": values })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["fields"]["name_en"].is_string());
    assert!(body["error"]["fields"]["image_url"].is_string());
    assert_eq!(body["values"]["name_en"], json!("M"));
    assert!(app.store.rows("products").await.is_empty());
}

#[tokio::test]
async fn activating_a_discount_deactivates_the_previous_one() {
    let app = TestApp::spawn().await;
    app.store
        .seed(
            "discounts",
            vec![
                row(json!({ "id": "a", "title_en": "Spring", "is_active": true })),
                row(json!({ "id": "b", "title_en": "Summer", "is_active": false })),
                row(json!({ "id": "c", "title_en": "Autumn", "is_active": false })),
            ],
        )
        .await;
    let token = app.login().await;

    let (status, body) = app
        .admin(reqwest::Method::POST, "/v1/admin/discounts/b/activate", &token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["toasts"][0]["message"], json!("Discount is now active"));

    let rows = app.store.rows("discounts").await;
    let active: Vec<_> = rows
        .iter()
        .filter(|row| row["is_active"] == json!(true))
        .map(|row| row["id"].clone())
        .collect();
    assert_eq!(active, vec![json!("b")]);
    let c = rows.iter().find(|row| row["id"] == json!("c")).unwrap();
    assert_eq!(c["is_active"], json!(false));

    let (_, body) = app.get("/v1/site/discount").await;
    assert_eq!(body["discount"]["title"], json!("Summer"));
    assert_eq!(body["show_flyer"], json!(true));

    let response = app
        .http
        .get(app.url("/v1/site/discount"))
        .header(header::COOKIE, "flyer_dismissed=b")
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["show_flyer"], json!(false));

    let (status, _) = app
        .admin(reqwest::Method::POST, "/v1/admin/faq/x/activate", &token, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dismissing_the_flyer_sets_a_cookie() {
    let app = TestApp::spawn().await;
    let response = app
        .http
        .post(app.url("/v1/site/discount/d1/dismiss"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("flyer_dismissed=d1"));
    assert!(cookie.contains("Max-Age="));
}

#[tokio::test]
async fn deleting_a_missing_row_reports_failure() {
    let app = TestApp::spawn().await;
    app.store
        .seed(
            "faq_items",
            vec![row(json!({ "id": "f1", "question_en": "Why?", "order_index": 0 }))],
        )
        .await;
    let token = app.login().await;

    let (status, body) = app
        .admin(reqwest::Method::DELETE, "/v1/admin/faq/f1", &token, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], json!("cancelled"));

    let (status, body) = app
        .admin(reqwest::Method::DELETE, "/v1/admin/faq/ghost?confirm=true", &token, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["toasts"][0]["level"], json!("error"));
    assert_eq!(app.store.rows("faq_items").await.len(), 1);

    let (status, body) = app
        .admin(reqwest::Method::DELETE, "/v1/admin/faq/f1?confirm=true", &token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["table"]["state"], json!("empty"));
}

#[tokio::test]
async fn multipart_uploads_replace_the_image_url() {
    let app = TestApp::spawn().await;
    let token = app.login().await;
    let values = json!({
        "name_en": "Laban",
        "name_ar": "لبن",
        "name_fr": "Lben",
        "description_en": "Cultured buttermilk drink.",
        "description_ar": "مشروب لبن مخمر تقليدي.",
        "description_fr": "Boisson de babeurre fermenté.",
    });
    let form = reqwest::multipart::Form::new()
        .text("values", values.to_string())
        .part(
            "image",
            reqwest::multipart::Part::bytes(vec![0xff, 0xd8, 0xff, 0xe0])
                .file_name("Laban Bottle.JPG")
                .mime_str("image/jpeg")
                .unwrap(),
        );
    let response = app
        .http
        .post(app.url("/v1/admin/products"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let url = body["row"]["image_url"].as_str().unwrap();
    assert!(url.starts_with("https://cdn.test/uploads/products/"));
    assert_eq!(app.storage.len().await, 1);
}

#[tokio::test]
async fn settings_are_a_singleton() {
    let app = TestApp::spawn().await;
    let token = app.login().await;

    let (_, form) = app
        .admin(reqwest::Method::GET, "/v1/admin/settings", &token, None)
        .await;
    assert_eq!(form["form"]["mode"], json!("add"));

    let values = json!({ "site_name": "Green Valley Dairy", "contact_email": "hello@farm.test" });
    let (status, _) = app
        .admin(
            reqwest::Method::PUT,
            "/v1/admin/settings",
            &token,
            Some(json!({ "values": values })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let values = json!({ "site_name": "Green Valley Farm", "contact_email": "hello@farm.test" });
    app.admin(
        reqwest::Method::PUT,
        "/v1/admin/settings",
        &token,
        Some(json!({ "values": values })),
    )
    .await;
    let rows = app.store.rows("site_settings").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["site_name"], json!("Green Valley Farm"));

    let (_, body) = app.get("/v1/site/contact").await;
    assert_eq!(body["settings"]["title"], json!("Green Valley Farm"));
}

#[tokio::test]
async fn settings_lookup_failure_never_adds_a_second_row() {
    let app = TestApp::spawn().await;
    app.store
        .seed(
            "site_settings",
            vec![row(json!({ "id": "s1", "site_name": "Green Valley Dairy" }))],
        )
        .await;
    let token = app.login().await;

    app.flaky.fail_next_list();
    let values = json!({ "site_name": "New Name" });
    let (status, body) = app
        .admin(
            reqwest::Method::PUT,
            "/v1/admin/settings",
            &token,
            Some(json!({ "values": values.clone() })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["toasts"][0]["level"], json!("error"));
    assert!(body["toasts"][0]["message"]
        .as_str()
        .unwrap()
        .contains("connection reset"));
    let rows = app.store.rows("site_settings").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["site_name"], json!("Green Valley Dairy"));

    let (status, _) = app
        .admin(
            reqwest::Method::PUT,
            "/v1/admin/settings",
            &token,
            Some(json!({ "values": values })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = app.store.rows("site_settings").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["site_name"], json!("New Name"));
}

#[tokio::test]
async fn edit_lookup_failures_keep_the_server_message() {
    let app = TestApp::spawn().await;
    app.store
        .seed(
            "faq_items",
            vec![row(json!({ "id": "f1", "question_en": "Why?", "order_index": 0 }))],
        )
        .await;
    let token = app.login().await;

    app.flaky.fail_next_get();
    let (status, body) = app
        .admin(
            reqwest::Method::PUT,
            "/v1/admin/faq/f1",
            &token,
            Some(json!({ "values": faq_values("How should I store milk?") })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["type"], json!("upstreamError"));
    assert_eq!(body["toasts"][0]["level"], json!("error"));
    assert!(body["toasts"][0]["message"]
        .as_str()
        .unwrap()
        .contains("connection reset"));

    app.flaky.fail_next_get();
    let (status, _) = app
        .admin(reqwest::Method::GET, "/v1/admin/faq/f1/edit", &token, None)
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, body) = app
        .admin(reqwest::Method::GET, "/v1/admin/faq/ghost/edit", &token, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], json!("FAQ item not found."));
}

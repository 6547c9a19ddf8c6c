use std::{collections::HashMap, fmt, net::SocketAddr, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use cucumber::{given, then, when, World as _};
use offroad::{
    config::{AppConfig, WeatherConfig},
    db::{init_pool, run_migrations},
    knowledge,
    routes::create_router,
    services::weather::{WeatherError, WeatherReport, WeatherSource},
    state::AppState,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

#[derive(Debug, cucumber::World, Default)]
struct AppWorld {
    state: Option<TestState>,
    sessions: HashMap<String, String>,
    last: Option<LastResponse>,
}

#[derive(Debug)]
struct LastResponse {
    status: StatusCode,
    location: Option<String>,
    set_cookie: Option<String>,
    body: Value,
}

impl AppWorld {
    fn test_state(&self) -> &TestState {
        self.state.as_ref().expect("state must be initialised first")
    }

    fn last(&self) -> &LastResponse {
        self.last.as_ref().expect("a request must have been sent")
    }

    fn field(&self, path: &str) -> &Value {
        let pointer = format!("/{}", path.replace('.', "/"));
        self.last()
            .body
            .pointer(&pointer)
            .unwrap_or_else(|| panic!("field {path} missing in {}", self.last().body))
    }

    fn items(&self, path: &str) -> &Vec<Value> {
        self.field(path)
            .as_array()
            .unwrap_or_else(|| panic!("field {path} is not a list"))
    }

    async fn send(&mut self, request: Request<Body>) {
        let response = self
            .test_state()
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let header_text = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let location = header_text(header::LOCATION);
        let set_cookie = header_text(header::SET_COOKIE).and_then(|raw| {
            raw.split(';').next().map(|pair| pair.trim().to_string())
        });
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        self.last = Some(LastResponse {
            status,
            location,
            set_cookie,
            body,
        });
    }

    async fn send_as(&mut self, user: Option<&str>, method: &str, uri: &str, json: Option<&str>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            let cookie = self
                .sessions
                .get(user)
                .unwrap_or_else(|| panic!("{user} has no session"))
                .clone();
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match json {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("valid request")).await;
    }

    async fn submit_credentials(&mut self, path: &str, username: &str, password: &str) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={username}&password={password}")))
            .expect("valid request");
        self.send(request).await;
        if let Some(cookie) = self.last().set_cookie.clone() {
            self.sessions.insert(username.to_string(), cookie);
        }
    }
}

struct TestState {
    app: AppState,
    router: Router,
    _root: TempDir,
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState").finish()
    }
}

impl TestState {
    async fn new(weather: Arc<dyn WeatherSource>) -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for bdd world")?;
        let db_path = root.path().join("bdd.sqlite");
        let database_url = format!("sqlite://{}", db_path.to_string_lossy());

        let config = AppConfig {
            database_url: database_url.clone(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cookie_secret: Some("bdd-cookie-secret".into()),
            weather: WeatherConfig::default(),
            session_ttl_days: 30,
        };

        let db = init_pool(&config.database_url).await?;
        run_migrations(&db).await?;

        let app = AppState::new(config, db, weather);
        let router = create_router(app.clone());
        Ok(Self {
            app,
            router,
            _root: root,
        })
    }
}

struct FailingWeather;

#[async_trait]
impl WeatherSource for FailingWeather {
    async fn current(&self, _destination: &str) -> Result<WeatherReport, WeatherError> {
        Err(WeatherError::NotConfigured)
    }
}

struct ClearSkies;

#[async_trait]
impl WeatherSource for ClearSkies {
    async fn current(&self, _destination: &str) -> Result<WeatherReport, WeatherError> {
        Ok(WeatherReport {
            temperature: Some("12.5°C".into()),
            feels_like: Some("11°C".into()),
            description: Some("clear sky".into()),
            wind_speed: Some("3.6 m/s".into()),
        })
    }
}

#[given("a fresh application")]
async fn given_fresh_application(world: &mut AppWorld) {
    world.state = Some(TestState::new(Arc::new(FailingWeather)).await.expect("state"));
    world.sessions.clear();
    world.last = None;
}

#[given("a fresh application with working weather")]
async fn given_application_with_weather(world: &mut AppWorld) {
    world.state = Some(TestState::new(Arc::new(ClearSkies)).await.expect("state"));
    world.sessions.clear();
    world.last = None;
}

#[given(regex = r#"^a registered user "([^"]+)" with password "([^"]+)"$"#)]
async fn given_registered_user(world: &mut AppWorld, username: String, password: String) {
    world.submit_credentials("/register", &username, &password).await;
    assert_eq!(world.last().status, StatusCode::SEE_OTHER);
}

#[when(regex = r#"^I register as "([^"]+)" with password "([^"]+)"$"#)]
async fn when_register(world: &mut AppWorld, username: String, password: String) {
    world.submit_credentials("/register", &username, &password).await;
}

#[when(regex = r#"^I log in as "([^"]+)" with password "([^"]+)"$"#)]
async fn when_login(world: &mut AppWorld, username: String, password: String) {
    world.sessions.remove(&username);
    world.submit_credentials("/login", &username, &password).await;
}

#[when(regex = r#"^"([^"]+)" logs out$"#)]
async fn when_logout(world: &mut AppWorld, username: String) {
    let cookie = world.sessions.get(&username).cloned();
    world.send_as(Some(&username), "GET", "/logout", None).await;
    // Keep the stale cookie so later requests prove the server forgot it.
    if let Some(cookie) = cookie {
        world.sessions.insert(username, cookie);
    }
}

#[when(regex = r#"^I GET "([^"]+)"$"#)]
async fn when_get(world: &mut AppWorld, uri: String) {
    world.send_as(None, "GET", &uri, None).await;
}

#[when(regex = r#"^"([^"]+)" GETs "([^"]+)"$"#)]
async fn when_user_gets(world: &mut AppWorld, username: String, uri: String) {
    world.send_as(Some(&username), "GET", &uri, None).await;
}

#[when(regex = r#"^I POST "([^"]+)" with body '(.*)'$"#)]
async fn when_post(world: &mut AppWorld, uri: String, body: String) {
    world.send_as(None, "POST", &uri, Some(&body)).await;
}

#[when(regex = r#"^"([^"]+)" POSTs "([^"]+)" with body '(.*)'$"#)]
async fn when_user_posts(world: &mut AppWorld, username: String, uri: String, body: String) {
    world.send_as(Some(&username), "POST", &uri, Some(&body)).await;
}

#[then(regex = r"^the response status is (\d+)$")]
async fn then_status(world: &mut AppWorld, expected: u16) {
    assert_eq!(world.last().status.as_u16(), expected, "body: {}", world.last().body);
}

#[then(regex = r#"^the response redirects to "([^"]+)"$"#)]
async fn then_redirects(world: &mut AppWorld, target: String) {
    assert!(world.last().status.is_redirection());
    assert_eq!(world.last().location.as_deref(), Some(target.as_str()));
}

#[then(regex = r#"^"([^"]+)" has a session$"#)]
async fn then_has_session(world: &mut AppWorld, username: String) {
    let cookie = world.sessions.get(&username).expect("session cookie stored");
    assert!(cookie.starts_with(offroad::auth::SESSION_COOKIE));
}

#[then(regex = r"^the response has (\d+) keys$")]
async fn then_key_count(world: &mut AppWorld, expected: usize) {
    let object = world.last().body.as_object().expect("json object");
    assert_eq!(object.len(), expected);
}

#[then("the tip belongs to its category")]
async fn then_tip_in_category(world: &mut AppWorld) {
    let category = world.field("category").as_str().expect("category text");
    let tip = world.field("tip").as_str().expect("tip text");
    let items = knowledge::guide().get(category).expect("known category");
    assert!(items.iter().any(|item| *item == tip));
    assert!(world.field("timestamp").is_string());
}

#[then("the response carries a JSON error")]
async fn then_json_error(world: &mut AppWorld) {
    let message = world.field("error").as_str().expect("error message text");
    assert!(!message.is_empty());
}

#[then(regex = r#"^the field "([^"]+)" equals "([^"]*)"$"#)]
async fn then_field_equals(world: &mut AppWorld, path: String, expected: String) {
    assert_eq!(world.field(&path).as_str(), Some(expected.as_str()));
}

#[then(regex = r#"^the field "([^"]+)" is the number (-?\d+)$"#)]
async fn then_field_number(world: &mut AppWorld, path: String, expected: i64) {
    assert_eq!(world.field(&path).as_i64(), Some(expected));
}

#[then(regex = r#"^the field "([^"]+)" is an empty object$"#)]
async fn then_field_empty(world: &mut AppWorld, path: String) {
    let object = world.field(&path).as_object().expect("json object");
    assert!(object.is_empty(), "expected empty, got {object:?}");
}

#[then(regex = r#"^the field "([^"]+)" has (\d+) items$"#)]
async fn then_field_items(world: &mut AppWorld, path: String, expected: usize) {
    assert_eq!(world.items(&path).len(), expected);
}

#[then(regex = r#"^the field "([^"]+)" has (\d+) distinct items$"#)]
async fn then_field_distinct(world: &mut AppWorld, path: String, expected: usize) {
    let items = world.items(&path);
    let mut unique: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(items.len(), expected);
    assert_eq!(unique.len(), expected);
}

#[then(regex = r#"^the recommendations (include|exclude) "([^"]+)"$"#)]
async fn then_recommendations(world: &mut AppWorld, mode: String, note: String) {
    let present = world
        .items("recommendations")
        .iter()
        .any(|item| item.as_str() == Some(note.as_str()));
    assert_eq!(present, mode == "include");
}

#[then(regex = r"^the response lists (\d+) trips?$")]
async fn then_trip_count(world: &mut AppWorld, expected: usize) {
    let trips = world.last().body.as_array().expect("trip list");
    assert_eq!(trips.len(), expected);
}

#[then(regex = r#"^the trip at position (\d+) has type "([^"]+)"$"#)]
async fn then_trip_type(world: &mut AppWorld, position: usize, expected: String) {
    let trips = world.last().body.as_array().expect("trip list");
    let trip = &trips[position - 1];
    assert_eq!(trip["trip_type"].as_str(), Some(expected.as_str()));
    assert!(trip["details"].is_object());
    assert!(trip["timestamp"].is_string());
}

#[then("no trips are stored")]
async fn then_no_trips(world: &mut AppWorld) {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips")
        .fetch_one(&world.test_state().app.db)
        .await
        .expect("count trips");
    assert_eq!(count, 0);
}

#[tokio::main]
async fn main() {
    AppWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}

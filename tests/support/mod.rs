//! Servicio falso en proceso con el mismo contrato HTTP que el backend real:
//! cookies de sesión, token CSRF y 403 para peticiones sin sesión.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use test_case_api::api::ApiClients;
use test_case_api::config::Settings;
use test_case_api::runner::{self, RunSummary};
use test_case_api::suites::{catalogue, Marker};

pub const USERNAME: &str = "qa";
pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone)]
struct StoredTest {
    id: i64,
    name: String,
    description: String,
    author: String,
    executor: Option<String>,
    status: Option<String>,
}

impl StoredTest {
    fn full(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "author": self.author,
            "executor": self.executor,
            "status": self.status,
        })
    }

    fn summary(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "author": self.author,
        })
    }
}

#[derive(Debug, Default)]
struct Store {
    next_test_id: i64,
    next_run_id: i64,
    tests: BTreeMap<i64, StoredTest>,
    csrf_tokens: HashSet<String>,
    sessions: HashSet<String>,
    /// Escrituras de estado que se responden con 200 pero no se guardan
    dropped_status_writes: usize,
    accept_duplicate_names: bool,
}

type Shared = Arc<Mutex<Store>>;

impl Store {
    fn issue_token(&mut self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.csrf_tokens.insert(token.clone());
        token
    }

    fn authenticated(&self, headers: &HeaderMap) -> bool {
        cookies(headers)
            .get("sessionid")
            .map_or(false, |session| self.sessions.contains(session))
    }

    fn csrf_ok(&self, headers: &HeaderMap) -> bool {
        let cookies = cookies(headers);
        let header = headers.get("x-csrftoken").and_then(|v| v.to_str().ok());
        match (cookies.get("csrftoken"), header) {
            (Some(cookie), Some(header)) => cookie == header && self.csrf_tokens.contains(cookie),
            _ => false,
        }
    }

    /// Sesión obligatoria; CSRF además en métodos que modifican
    fn guard(&self, method: &Method, headers: &HeaderMap) -> Option<Response> {
        if !self.authenticated(headers) || (*method != Method::GET && !self.csrf_ok(headers)) {
            return Some(reply(
                StatusCode::FORBIDDEN,
                Some(json!({"detail": "Authentication credentials were not provided."})),
                &[],
            ));
        }
        None
    }

    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.tests
            .values()
            .any(|t| t.name == name && Some(t.id) != except)
    }
}

fn cookies(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

fn reply(status: StatusCode, body: Option<Value>, set_cookies: &[String]) -> Response {
    let mut response = match body {
        Some(body) => (status, Json(body)).into_response(),
        None => status.into_response(),
    };
    for cookie in set_cookies {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

fn error(status: StatusCode, message: &str) -> Response {
    reply(status, Some(json!({ "error": message })), &[])
}

fn bad_input() -> Response {
    error(StatusCode::BAD_REQUEST, "bad input data")
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "test not found")
}

fn parse_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or(Value::Null)
}

fn field<'a>(body: &'a Value, name: &str) -> Option<&'a str> {
    body.get(name).and_then(Value::as_str)
}

/// Nombre y descripción no vacíos y dentro de los límites del modelo
fn valid_fields(name: &str, description: &str) -> bool {
    (1..=100).contains(&name.chars().count()) && (1..=1000).contains(&description.chars().count())
}

async fn token(State(store): State<Shared>) -> Response {
    let token = store.lock().unwrap().issue_token();
    let cookie = format!("csrftoken={}; Path=/; SameSite=Lax", token);
    let mut response = (StatusCode::OK, token).into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

async fn login(State(store): State<Shared>, headers: HeaderMap, body: String) -> Response {
    let mut store = store.lock().unwrap();
    if !store.csrf_ok(&headers) {
        return reply(StatusCode::FORBIDDEN, Some(json!({"detail": "CSRF Failed"})), &[]);
    }
    let body = parse_body(&body);
    let (Some(username), Some(password)) = (field(&body, "username"), field(&body, "password")) else {
        return bad_input();
    };
    if username != USERNAME || password != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "username or password not correct");
    }

    let session = Uuid::new_v4().simple().to_string();
    store.sessions.insert(session.clone());
    let rotated = store.issue_token();
    reply(
        StatusCode::OK,
        None,
        &[
            format!("sessionid={}; Path=/; HttpOnly", session),
            format!("csrftoken={}; Path=/; SameSite=Lax", rotated),
        ],
    )
}

async fn logout(State(store): State<Shared>, headers: HeaderMap) -> Response {
    let mut store = store.lock().unwrap();
    if let Some(session) = cookies(&headers).get("sessionid") {
        store.sessions.remove(session);
    }
    reply(
        StatusCode::OK,
        None,
        &["sessionid=\"\"; expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; Path=/".to_string()],
    )
}

async fn list_tests(
    State(store): State<Shared>,
    method: Method,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let store = store.lock().unwrap();
    if let Some(denied) = store.guard(&method, &headers) {
        return denied;
    }
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let size: usize = params.get("size").and_then(|s| s.parse().ok()).unwrap_or(20);

    let tests: Vec<Value> = store
        .tests
        .values()
        .skip(page.saturating_mul(size))
        .take(size)
        .map(StoredTest::full)
        .collect();
    reply(
        StatusCode::OK,
        Some(json!({"page": page, "size": size, "total": store.tests.len(), "tests": tests})),
        &[],
    )
}

async fn create_test(State(store): State<Shared>, method: Method, headers: HeaderMap, body: String) -> Response {
    let mut store = store.lock().unwrap();
    if let Some(denied) = store.guard(&method, &headers) {
        return denied;
    }
    let body = parse_body(&body);
    let (Some(name), Some(description)) = (field(&body, "name"), field(&body, "description")) else {
        return bad_input();
    };
    if !valid_fields(name, description) {
        return bad_input();
    }
    if !store.accept_duplicate_names && store.name_taken(name, None) {
        return error(StatusCode::BAD_REQUEST, "test with such name already exists");
    }

    store.next_test_id += 1;
    let id = store.next_test_id;
    store.tests.insert(
        id,
        StoredTest {
            id,
            name: name.to_string(),
            description: description.to_string(),
            author: USERNAME.to_string(),
            executor: None,
            status: None,
        },
    );
    reply(StatusCode::CREATED, Some(json!({ "test_id": id })), &[])
}

/// Ids no numéricos no casan con la ruta: 404 antes de mirar la sesión
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

async fn get_test(State(store): State<Shared>, method: Method, headers: HeaderMap, Path(raw): Path<String>) -> Response {
    let Some(id) = parse_id(&raw) else {
        return not_found();
    };
    let store = store.lock().unwrap();
    if let Some(denied) = store.guard(&method, &headers) {
        return denied;
    }
    match store.tests.get(&id) {
        Some(test) => reply(StatusCode::OK, Some(test.full()), &[]),
        None => not_found(),
    }
}

async fn update_test(
    State(store): State<Shared>,
    method: Method,
    headers: HeaderMap,
    Path(raw): Path<String>,
    body: String,
) -> Response {
    let Some(id) = parse_id(&raw) else {
        return not_found();
    };
    let mut store = store.lock().unwrap();
    if let Some(denied) = store.guard(&method, &headers) {
        return denied;
    }
    let Some(current) = store.tests.get(&id).cloned() else {
        return not_found();
    };

    let body = parse_body(&body);
    let name = field(&body, "name");
    let description = field(&body, "description");
    let (name, description) = if method == Method::PUT {
        let (Some(name), Some(description)) = (name, description) else {
            return bad_input();
        };
        (name.to_string(), description.to_string())
    } else {
        if name.is_none() && description.is_none() {
            return bad_input();
        }
        (
            name.map_or(current.name.clone(), str::to_string),
            description.map_or(current.description.clone(), str::to_string),
        )
    };
    if !valid_fields(&name, &description) {
        return bad_input();
    }
    if store.name_taken(&name, Some(id)) {
        return error(StatusCode::BAD_REQUEST, "test with such name already exists");
    }

    let updated = StoredTest {
        name,
        description,
        ..current
    };
    let response = updated.summary();
    store.tests.insert(id, updated);
    reply(StatusCode::OK, Some(response), &[])
}

async fn delete_test(State(store): State<Shared>, method: Method, headers: HeaderMap, Path(raw): Path<String>) -> Response {
    let Some(id) = parse_id(&raw) else {
        return not_found();
    };
    let mut store = store.lock().unwrap();
    if let Some(denied) = store.guard(&method, &headers) {
        return denied;
    }
    match store.tests.remove(&id) {
        Some(_) => reply(StatusCode::OK, Some(json!({"status": "deleted"})), &[]),
        None => not_found(),
    }
}

async fn set_status(
    State(store): State<Shared>,
    method: Method,
    headers: HeaderMap,
    Path(raw): Path<String>,
    body: String,
) -> Response {
    let Some(id) = parse_id(&raw) else {
        return not_found();
    };
    let mut store = store.lock().unwrap();
    if let Some(denied) = store.guard(&method, &headers) {
        return denied;
    }
    let body = parse_body(&body);
    let Some(status) = field(&body, "status").map(str::to_string) else {
        return bad_input();
    };
    if !store.tests.contains_key(&id) {
        return not_found();
    }
    if store.dropped_status_writes > 0 {
        store.dropped_status_writes -= 1;
    } else if let Some(test) = store.tests.get_mut(&id) {
        test.status = Some(status);
        test.executor = Some(USERNAME.to_string());
    }

    store.next_run_id += 1;
    reply(StatusCode::OK, Some(json!({ "runId": store.next_run_id })), &[])
}

async fn statistics(State(store): State<Shared>, method: Method, headers: HeaderMap) -> Response {
    let store = store.lock().unwrap();
    if let Some(denied) = store.guard(&method, &headers) {
        return denied;
    }
    let count = |wanted: &str| {
        store
            .tests
            .values()
            .filter(|t| t.status.as_deref() == Some(wanted))
            .count()
    };
    let total = store.tests.len();
    let passed = count("PASS");
    let failed = count("FAIL");
    reply(
        StatusCode::OK,
        Some(json!({"total": total, "passed": passed, "failed": failed, "norun": total - passed - failed})),
        &[],
    )
}

fn router(store: Shared) -> Router {
    Router::new()
        .route("/api/auth/token", get(token))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", get(logout))
        .route("/api/tests", get(list_tests))
        .route("/api/tests/new", post(create_test))
        .route(
            "/api/tests/:id",
            get(get_test).put(update_test).patch(update_test).delete(delete_test),
        )
        .route("/api/tests/:id/status", post(set_status))
        .route("/api/getstat", get(statistics))
        .with_state(store)
}

/// Servicio falso escuchando en un puerto libre de 127.0.0.1
pub struct FakeService {
    pub base_url: String,
}

impl FakeService {
    pub fn start() -> Self {
        Self::start_with(Store::default())
    }

    /// Servicio que acepta las primeras `count` escrituras de estado sin guardarlas
    pub fn start_dropping_status_writes(count: usize) -> Self {
        Self::start_with(Store {
            dropped_status_writes: count,
            ..Store::default()
        })
    }

    /// Servicio que no rechaza nombres repetidos al crear
    pub fn start_accepting_duplicates() -> Self {
        Self::start_with(Store {
            accept_duplicate_names: true,
            ..Store::default()
        })
    }

    fn start_with(store: Store) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake service");
        listener.set_nonblocking(true).expect("non-blocking listener");
        let addr = listener.local_addr().expect("local addr");
        let app = router(Arc::new(Mutex::new(store)));

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .expect("tokio runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, app).await.expect("serve fake service");
            });
        });

        FakeService {
            base_url: format!("http://{}", addr),
        }
    }

    pub fn settings(&self) -> Settings {
        Settings::for_base_url(&self.base_url).with_credentials(USERNAME, PASSWORD)
    }

    pub fn clients(&self) -> ApiClients {
        ApiClients::new(self.settings()).expect("api clients")
    }
}

/// Ejecuta un único escenario del catálogo por nombre exacto
pub fn run_named(service: &FakeService, name: &str) -> RunSummary {
    let clients = service.clients();
    let scenarios = catalogue();
    let selected: Vec<_> = scenarios.iter().filter(|s| s.name == name).collect();
    assert_eq!(selected.len(), 1, "escenario {} no encontrado", name);
    runner::run(&clients, &selected, 1)
}

/// Ejecuta los escenarios con `marker` y exige que todos pasen
pub fn run_marker(marker: Marker, workers: usize) -> RunSummary {
    let service = FakeService::start();
    let clients = service.clients();
    let scenarios = catalogue();
    let selected = runner::select(&scenarios, &[marker], None);
    assert!(!selected.is_empty(), "sin escenarios para {}", marker);

    let summary = runner::run(&clients, &selected, workers);
    let failures: Vec<String> = summary
        .failures()
        .map(|o| format!("{} [{}]: {}", o.name, o.category, o.message))
        .collect();
    assert!(failures.is_empty(), "escenarios fallidos:\n{}", failures.join("\n"));
    summary
}

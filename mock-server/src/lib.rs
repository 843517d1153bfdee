use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Response envelope wrapped around every JSON reply.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn ok(data: impl Serialize) -> Self {
        Self {
            status: "OK".to_string(),
            message: None,
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }

    pub fn err(status: &str, message: &str) -> Self {
        Self {
            status: status.to_string(),
            message: Some(message.to_string()),
            data: Value::Null,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: String,
}

pub type Db = Arc<RwLock<HashMap<u64, User>>>;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";

fn seed() -> HashMap<u64, User> {
    [(1, "alice"), (7, "bob")]
        .into_iter()
        .map(|(id, name)| {
            (
                id,
                User {
                    id,
                    name: name.to_string(),
                },
            )
        })
        .collect()
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    Router::new()
        .route("/api/users/{id}", get(get_user).put(update_user))
        .route("/api/echo", get(echo_query).post(echo_body))
        .route("/api/login", post(login))
        .route("/api/session", get(session_redirect))
        .route("/api/broken", get(broken))
        .route("/api/unavailable", get(unavailable))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found(id: u64) -> Envelope {
    Envelope::err("NOT_FOUND", &format!("user {id} does not exist"))
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Json<Envelope> {
    let users = db.read().await;
    Json(users.get(&id).map_or_else(|| not_found(id), |user| Envelope::ok(user)))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateUser>,
) -> Json<Envelope> {
    let mut users = db.write().await;
    match users.get_mut(&id) {
        Some(user) => {
            user.name = input.name;
            Json(Envelope::ok(&*user))
        }
        None => Json(not_found(id)),
    }
}

async fn echo_query(Query(query): Query<HashMap<String, String>>) -> Json<Envelope> {
    debug!("echo query {query:?}");
    Json(Envelope::ok(query))
}

/// Decode a request body according to its content type.
pub fn parse_body(headers: &HeaderMap, body: &str) -> Value {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if content_type.starts_with(FORM_CONTENT_TYPE) {
        let fields: Map<String, Value> = url::form_urlencoded::parse(body.as_bytes())
            .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
            .collect();
        return Value::Object(fields);
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

async fn echo_body(headers: HeaderMap, body: String) -> Json<Envelope> {
    debug!("echo body {body:?}");
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(Envelope::ok(serde_json::json!({
        "contentType": content_type,
        "raw": body,
        "body": parse_body(&headers, &body),
    })))
}

async fn login(headers: HeaderMap, body: String) -> Json<Envelope> {
    let credentials = parse_body(&headers, &body);
    let username = credentials["username"].as_str().unwrap_or_default();
    let password = credentials["password"].as_str().unwrap_or_default();
    if username == USERNAME && password == PASSWORD {
        debug!("login accepted for {username}");
        return Json(Envelope::ok(serde_json::json!({
            "username": username,
            "token": Uuid::new_v4(),
        })));
    }
    Json(Envelope::err("BAD_CREDENTIALS", "invalid username or password"))
}

/// What the login gateway does to an API call once the session is gone.
async fn session_redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/login")])
}

async fn broken() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::err("SERVER_ERROR", "boom")),
    )
}

async fn unavailable() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "service unavailable")
}

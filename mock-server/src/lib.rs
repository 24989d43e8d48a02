//! In-memory stand-in for the Bitly v3 link API.
//!
//! Every reply is wrapped in the `{status_code, status_txt, data}` envelope
//! and, as the real service does, failures are reported inside an HTTP 200.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_SHORT_DOMAIN: &str = "http://bit.ly";
pub const HASH_LEN: usize = 6;

#[derive(Clone, Debug, Serialize)]
pub struct StoredLink {
    pub hash: String,
    pub long_url: String,
    pub title: String,
    pub created_at: i64,
    pub created_by: String,
    pub clicks: i64,
}

#[derive(Debug, Default)]
pub struct Store {
    by_hash: HashMap<String, StoredLink>,
    by_long_url: HashMap<String, String>,
}

impl Store {
    /// Register a bitlink. Replaces any existing link with the same hash.
    pub fn insert(&mut self, link: StoredLink) {
        self.by_long_url.insert(link.long_url.clone(), link.hash.clone());
        self.by_hash.insert(link.hash.clone(), link);
    }

    pub fn get(&self, hash: &str) -> Option<&StoredLink> {
        self.by_hash.get(hash)
    }

    pub fn hash_for(&self, long_url: &str) -> Option<&str> {
        self.by_long_url.get(long_url).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    fn mint_hash(&self) -> String {
        loop {
            let hash: String = Uuid::new_v4().simple().to_string()[..HASH_LEN].to_string();
            if !self.by_hash.contains_key(&hash) {
                return hash;
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    access_token: Arc<str>,
    short_domain: Arc<str>,
    login: Arc<str>,
}

impl AppState {
    pub fn new(access_token: &str) -> Self {
        Self::with_store(access_token, Store::default())
    }

    pub fn with_store(access_token: &str, store: Store) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            access_token: access_token.into(),
            short_domain: DEFAULT_SHORT_DOMAIN.into(),
            login: "mock".into(),
        }
    }

    pub fn store(&self) -> Arc<RwLock<Store>> {
        self.store.clone()
    }

    fn short_url(&self, hash: &str) -> String {
        format!("{}/{hash}", self.short_domain)
    }
}

pub fn app(access_token: &str) -> Router {
    router(AppState::new(access_token))
}

pub fn router(state: AppState) -> Router {
    let v3 = Router::new()
        .route("/shorten", get(shorten))
        .route("/expand", get(expand))
        .route("/info", get(info))
        .route("/link/lookup", get(lookup))
        .route("/link/clicks", get(clicks))
        .route("/user/popular_links", get(popular_links));
    Router::new().nest("/v3", v3).with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

type Params = Query<Vec<(String, String)>>;

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "status_code": 200, "status_txt": "OK", "data": data }))
}

fn fail(status_code: u16, status_txt: &str) -> Json<Value> {
    Json(json!({ "status_code": status_code, "status_txt": status_txt, "data": null }))
}

fn values<'a>(params: &'a [(String, String)], name: &'a str) -> impl Iterator<Item = &'a str> {
    params
        .iter()
        .filter(move |(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn first<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

/// Reject the request unless it carries the configured access token.
fn authorize(state: &AppState, params: &[(String, String)]) -> Result<(), Json<Value>> {
    match first(params, "access_token") {
        Some(token) if token == &*state.access_token => Ok(()),
        _ => Err(fail(500, "INVALID_ACCESS_TOKEN")),
    }
}

/// Accept either a full short URL or a bare hash.
fn hash_of(short_url: &str) -> &str {
    short_url.trim_end_matches('/').rsplit('/').next().unwrap_or(short_url)
}

// The service reports pages it could not fetch a title for as `null`.
fn untitled_as_null(title: &str) -> Option<&str> {
    Some(title).filter(|t| !t.is_empty())
}

fn is_web_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

async fn shorten(State(state): State<AppState>, Query(params): Params) -> Json<Value> {
    if let Err(reply) = authorize(&state, &params) {
        return reply;
    }
    let Some(long_url) = first(&params, "longUrl") else {
        return fail(500, "MISSING_ARG_LONGURL");
    };
    if !is_web_url(long_url) {
        return fail(500, "INVALID_URI");
    }

    let mut store = state.store.write().await;
    let existing = store.hash_for(long_url).map(str::to_string);
    let (hash, new_hash) = match existing {
        Some(hash) => (hash, 0),
        None => {
            let hash = store.mint_hash();
            store.insert(StoredLink {
                hash: hash.clone(),
                long_url: long_url.to_string(),
                title: String::new(),
                created_at: unix_now(),
                created_by: state.login.to_string(),
                clicks: 0,
            });
            (hash, 1)
        }
    };

    ok(json!({
        "long_url": long_url,
        "url": state.short_url(&hash),
        "hash": hash,
        "global_hash": hash,
        "new_hash": new_hash,
    }))
}

async fn expand(State(state): State<AppState>, Query(params): Params) -> Json<Value> {
    if let Err(reply) = authorize(&state, &params) {
        return reply;
    }
    let short_urls: Vec<&str> = values(&params, "shortUrl").collect();
    if short_urls.is_empty() {
        return fail(500, "MISSING_ARG_SHORTURL");
    }

    let store = state.store.read().await;
    let entries: Vec<Value> = short_urls
        .into_iter()
        .map(|short_url| match store.get(hash_of(short_url)) {
            Some(link) => json!({
                "short_url": short_url,
                "long_url": link.long_url,
                "global_hash": link.hash,
                "user_hash": link.hash,
            }),
            None => json!({ "short_url": short_url, "error": "NOT_FOUND" }),
        })
        .collect();
    ok(json!({ "expand": entries }))
}

async fn info(State(state): State<AppState>, Query(params): Params) -> Json<Value> {
    if let Err(reply) = authorize(&state, &params) {
        return reply;
    }
    let short_urls: Vec<&str> = values(&params, "shortUrl").collect();
    if short_urls.is_empty() {
        return fail(500, "MISSING_ARG_SHORTURL");
    }

    let store = state.store.read().await;
    let entries: Vec<Value> = short_urls
        .into_iter()
        .map(|short_url| match store.get(hash_of(short_url)) {
            Some(link) => json!({
                "short_url": short_url,
                "global_hash": link.hash,
                "user_hash": link.hash,
                "title": untitled_as_null(&link.title),
                "created_at": link.created_at,
                "created_by": link.created_by,
            }),
            None => json!({ "short_url": short_url, "error": "NOT_FOUND" }),
        })
        .collect();
    ok(json!({ "info": entries }))
}

async fn lookup(State(state): State<AppState>, Query(params): Params) -> Json<Value> {
    if let Err(reply) = authorize(&state, &params) {
        return reply;
    }
    let urls: Vec<&str> = values(&params, "url").collect();
    if urls.is_empty() {
        return fail(500, "MISSING_ARG_URL");
    }

    let store = state.store.read().await;
    let entries: Vec<Value> = urls
        .into_iter()
        .map(|url| match store.hash_for(url) {
            Some(hash) => json!({ "url": url, "aggregate_link": state.short_url(hash) }),
            None => json!({ "url": url, "error": "NOT_FOUND" }),
        })
        .collect();
    ok(json!({ "link_lookup": entries }))
}

/// Read `unit` and `units`, defaulting to all days.
fn window(params: &[(String, String)]) -> Result<(String, i64), Json<Value>> {
    let unit = first(params, "unit").unwrap_or("day");
    if !matches!(unit, "minute" | "hour" | "day" | "week" | "month") {
        return Err(fail(500, "INVALID_UNIT"));
    }
    let units = match first(params, "units") {
        Some(raw) => raw.parse::<i64>().map_err(|_| fail(500, "INVALID_UNITS"))?,
        None => -1,
    };
    Ok((unit.to_string(), units))
}

async fn clicks(State(state): State<AppState>, Query(params): Params) -> Json<Value> {
    if let Err(reply) = authorize(&state, &params) {
        return reply;
    }
    let Some(link) = first(&params, "link") else {
        return fail(500, "MISSING_ARG_LINK");
    };
    let (unit, units) = match window(&params) {
        Ok(window) => window,
        Err(reply) => return reply,
    };

    let store = state.store.read().await;
    match store.get(hash_of(link)) {
        Some(stored) => ok(json!({
            "link_clicks": stored.clicks,
            "tz_offset": 0,
            "unit": unit,
            "units": units,
        })),
        None => fail(404, "NOT_FOUND"),
    }
}

async fn popular_links(State(state): State<AppState>, Query(params): Params) -> Json<Value> {
    if let Err(reply) = authorize(&state, &params) {
        return reply;
    }
    if let Err(reply) = window(&params) {
        return reply;
    }

    let store = state.store.read().await;
    let mut clicked: Vec<&StoredLink> = store.by_hash.values().filter(|l| l.clicks > 0).collect();
    clicked.sort_by(|a, b| b.clicks.cmp(&a.clicks).then_with(|| a.hash.cmp(&b.hash)));

    let entries: Vec<Value> = clicked
        .into_iter()
        .map(|l| json!({ "link": state.short_url(&l.hash), "clicks": l.clicks }))
        .collect();
    ok(json!({ "popular_links": entries }))
}

//! HTTP surface.
//!
//! Thin request/response plumbing over the todo store. Handlers never see
//! remote-store faults: the store swallows them and hands back the
//! resulting document, so the only failures a client can observe here are
//! transport-level. Everything under `/api` requires a session cookie;
//! failed auth redirects to the login view, never a structured error code.

pub mod auth;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use serde::Deserialize;
use tokio::task;

use crate::doc::Document;
use crate::store::TodoStore;
use auth::Sessions;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TodoStore>,
    pub sessions: Arc<Sessions>,
}

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/todos", get(list_todos).post(add_item).delete(remove_item))
        .route("/todos/toggle", put(toggle_item))
        .route("/todos/edit", put(edit_item))
        .route("/sections", post(add_section).delete(remove_section))
        .route("/sync", post(sync_now))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .nest("/api", api)
        .route("/login", get(login_form).post(login))
        .route("/webhook/github", post(webhook))
        .with_state(state)
}

// =============================================================================
// Request payloads
// =============================================================================

#[derive(Deserialize)]
struct AddItem {
    section: String,
    text: String,
}

#[derive(Deserialize)]
struct ItemRef {
    section: String,
    index: usize,
}

#[derive(Deserialize)]
struct EditItem {
    section: String,
    index: usize,
    text: String,
}

#[derive(Deserialize)]
struct SectionName {
    name: String,
}

#[derive(Deserialize)]
struct Login {
    username: String,
    password: String,
}

// =============================================================================
// Todo handlers
// =============================================================================

async fn list_todos(State(state): State<AppState>) -> Result<Json<Document>, StatusCode> {
    run_op(state, |store| store.list()).await
}

async fn add_item(
    State(state): State<AppState>,
    Json(req): Json<AddItem>,
) -> Result<Json<Document>, StatusCode> {
    run_op(state, move |store| store.add_item(&req.section, &req.text)).await
}

async fn toggle_item(
    State(state): State<AppState>,
    Json(req): Json<ItemRef>,
) -> Result<Json<Document>, StatusCode> {
    run_op(state, move |store| {
        store.toggle_item(&req.section, req.index)
    })
    .await
}

async fn edit_item(
    State(state): State<AppState>,
    Json(req): Json<EditItem>,
) -> Result<Json<Document>, StatusCode> {
    run_op(state, move |store| {
        store.edit_item(&req.section, req.index, &req.text)
    })
    .await
}

async fn remove_item(
    State(state): State<AppState>,
    Json(req): Json<ItemRef>,
) -> Result<Json<Document>, StatusCode> {
    run_op(state, move |store| {
        store.remove_item(&req.section, req.index)
    })
    .await
}

async fn add_section(
    State(state): State<AppState>,
    Json(req): Json<SectionName>,
) -> Result<Json<Document>, StatusCode> {
    run_op(state, move |store| store.add_section(&req.name)).await
}

async fn remove_section(
    State(state): State<AppState>,
    Json(req): Json<SectionName>,
) -> Result<Json<Document>, StatusCode> {
    run_op(state, move |store| store.remove_section(&req.name)).await
}

async fn sync_now(State(state): State<AppState>) -> Result<Json<Document>, StatusCode> {
    run_op(state, |store| store.list()).await
}

async fn webhook(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StatusCode> {
    let store = state.store.clone();
    task::spawn_blocking(move || store.refresh())
        .await
        .map_err(|err| {
            tracing::error!("refresh task panicked: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Store calls are blocking (filesystem plus libgit2), so they run on the
/// blocking pool.
async fn run_op<F>(state: AppState, op: F) -> Result<Json<Document>, StatusCode>
where
    F: FnOnce(&TodoStore) -> crate::Result<Document> + Send + 'static,
{
    let store = state.store.clone();
    let doc = task::spawn_blocking(move || op(&store))
        .await
        .map_err(|err| {
            tracing::error!("store task panicked: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|err| {
            tracing::error!("store operation failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(doc))
}

// =============================================================================
// Auth
// =============================================================================

async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = session_cookie(request.headers())
        && state.sessions.verify(&cookie)
    {
        return next.run(request).await;
    }
    Redirect::to("/login?error=1").into_response()
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(auth::SESSION_COOKIE)?
            .strip_prefix('=')
            .map(str::to_string)
    })
}

const LOGIN_PAGE: &str = "<!doctype html>\n\
<html><head><title>gitodo</title></head><body>\n\
<form method=\"post\" action=\"/login\">\n\
<input name=\"username\" placeholder=\"username\" autofocus>\n\
<input name=\"password\" type=\"password\" placeholder=\"password\">\n\
<button type=\"submit\">Sign in</button>\n\
</form>\n\
</body></html>\n";

async fn login_form() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

async fn login(State(state): State<AppState>, Form(login): Form<Login>) -> Response {
    if state.sessions.check_login(&login.username, &login.password) {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            auth::SESSION_COOKIE,
            state.sessions.issue()
        );
        ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
    } else {
        Redirect::to("/login?error=1").into_response()
    }
}

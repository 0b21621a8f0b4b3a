use super::cache::OptionsCache;
use super::engine::{filter_for_event, QueryEvent, ResetPolicy};
use super::sessions::{SessionSnapshot, SessionStore};
use super::types::{
    BooksResponse, ErrorResponse, HealthResponse, OpenSessionResponse, OptionsResponse,
    SearchParams, SearchResponse, SessionResponse,
};
use crate::catalog::store::Catalog;
use crate::catalog::types::{Book, FetchState};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use uuid::Uuid;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub options: Arc<OptionsCache>,
    pub sessions: Arc<SessionStore>,
    pub policy: ResetPolicy,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, policy: ResetPolicy) -> Self {
        Self::with_sessions(catalog, policy, SessionStore::new(policy))
    }

    pub fn with_sessions(
        catalog: Arc<Catalog>,
        policy: ResetPolicy,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            catalog,
            options: OptionsCache::new(),
            sessions,
            policy,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/books", get(handle_books))
        .route("/api/search", get(handle_search))
        .route("/api/options", get(handle_options))
        .route("/api/reload", post(handle_reload))
        .route("/api/sessions", post(handle_open_session))
        .route(
            "/api/sessions/:id",
            get(handle_get_session).delete(handle_close_session),
        )
        .route("/api/sessions/:id/events", post(handle_session_event))
        .with_state(state)
}

/// Maps the catalog state to the record set, or to the loading / failure response.
fn ready(state: FetchState) -> Result<Arc<[Book]>, ApiError> {
    match state {
        FetchState::Ready(books) => Ok(books),
        FetchState::Pending => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                status: "loading".to_string(),
                error: None,
            }),
        )),
        failed @ FetchState::Failed(_) => Err((
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                status: "error".to_string(),
                error: failed.error_message(),
            }),
        )),
    }
}

fn not_found(id: &Uuid) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            status: "not_found".to_string(),
            error: Some(format!("unknown session {}", id)),
        }),
    )
}

fn event_from_params(params: &SearchParams) -> Result<QueryEvent, ApiError> {
    let value = params.q.clone();
    match params.event.as_deref().unwrap_or("change") {
        "change" => Ok(QueryEvent::Change { value }),
        "focus" => Ok(QueryEvent::Focus { value }),
        "keydown" => Ok(QueryEvent::KeyDown {
            value,
            key: params.key.clone().unwrap_or_default(),
        }),
        other => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                status: "bad_request".to_string(),
                error: Some(format!("unknown event {}", other)),
            }),
        )),
    }
}

fn session_response(session_id: Uuid, snapshot: SessionSnapshot) -> SessionResponse {
    SessionResponse {
        session_id,
        state: snapshot.state.to_string(),
        query: snapshot.query,
        count: snapshot.results.len(),
        total_count: snapshot.unfiltered.len(),
        results: snapshot.results,
    }
}

pub async fn handle_health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.catalog.state().await {
        FetchState::Ready(books) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ready".to_string(),
                books: books.len(),
            }),
        ),
        FetchState::Pending => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "loading".to_string(),
                books: 0,
            }),
        ),
        FetchState::Failed(_) => (
            StatusCode::BAD_GATEWAY,
            Json(HealthResponse {
                status: "error".to_string(),
                books: 0,
            }),
        ),
    }
}

pub async fn handle_books(State(state): State<AppState>) -> Result<Json<BooksResponse>, ApiError> {
    let books = ready(state.catalog.state().await)?;
    Ok(Json(BooksResponse {
        count: books.len(),
        books,
    }))
}

pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let books = ready(state.catalog.state().await)?;
    let event = event_from_params(&params)?;

    let results = filter_for_event(&books, &event, state.policy);
    tracing::debug!("Search {:?} -> {} results", params.q, results.len());

    Ok(Json(SearchResponse {
        query: params.q,
        total_count: books.len(),
        count: results.len(),
        results,
        unfiltered: books,
    }))
}

pub async fn handle_options(
    State(state): State<AppState>,
) -> Result<Json<OptionsResponse>, ApiError> {
    let books = ready(state.catalog.state().await)?;
    let options = state.options.get_or_compute(&books);
    Ok(Json(OptionsResponse {
        count: options.len(),
        options,
    }))
}

/// Refetches the catalog. A failure is reported here while searches keep using the
/// previously loaded books.
pub async fn handle_reload(State(state): State<AppState>) -> Result<Json<BooksResponse>, ApiError> {
    let books = state.catalog.reload().await.map_err(|err| {
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                status: "error".to_string(),
                error: FetchState::Failed(format!("{:#}", err)).error_message(),
            }),
        )
    })?;
    Ok(Json(BooksResponse {
        count: books.len(),
        books,
    }))
}

pub async fn handle_open_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<OpenSessionResponse>), ApiError> {
    let books = ready(state.catalog.state().await)?;
    let session_id = state.sessions.open(books);
    Ok((StatusCode::CREATED, Json(OpenSessionResponse { session_id })))
}

pub async fn handle_session_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(event): Json<QueryEvent>,
) -> Result<Json<SessionResponse>, ApiError> {
    let books = ready(state.catalog.state().await)?;
    let snapshot = state
        .sessions
        .apply(&id, books, &event)
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(session_response(id, snapshot)))
}

pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let snapshot = state.sessions.get(&id).ok_or_else(|| not_found(&id))?;
    Ok(Json(session_response(id, snapshot)))
}

pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.close(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

#![cfg(feature = "web")]

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::{AppConfig, StoreKind};
use crate::cycle::{CycleOutcome, FormSnapshot, Trigger, dispatch, observe, run_cycle};
use crate::downloader;
use crate::error::{DashboardError, StoreError};
use crate::graph::{GraphOptions, render_scatter_svg};
use crate::saving::FileStore;
use crate::session::{SESSION_COOKIE, SessionRegistry};
use crate::sqlite::SqliteStore;
use crate::store::{DatasetStore, MemoryStore};

/// The store every request's cycle runs against
pub enum Backend {
    /// One dataset shared by every client of this process.
    Memory(Mutex<MemoryStore>),
    /// One dataset per session cookie.
    Session(SessionRegistry),
    Sqlite(Mutex<SqliteStore>),
    File(Mutex<FileStore>),
}

impl Backend {
    pub fn open(kind: &StoreKind) -> Result<Self, DashboardError> {
        Ok(match kind {
            StoreKind::Memory => Backend::Memory(Mutex::new(MemoryStore::new())),
            StoreKind::Session => Backend::Session(SessionRegistry::new()),
            StoreKind::Sqlite(path) => Backend::Sqlite(Mutex::new(SqliteStore::open(path)?)),
            StoreKind::File(path) => Backend::File(Mutex::new(FileStore::new(path))),
        })
    }
}

pub struct AppState {
    backend: Backend,
}

impl AppState {
    pub fn new(backend: Backend) -> Self {
        AppState { backend }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, DashboardError> {
        Ok(Self::new(Backend::open(&config.store)?))
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Runs one cycle against the configured store
    ///
    /// For the session backend the returned jar carries the (possibly new)
    /// session cookie.
    pub fn cycle(
        &self,
        jar: CookieJar,
        trigger: Trigger,
        form: &FormSnapshot,
    ) -> Result<(CookieJar, CycleOutcome), DashboardError> {
        let outcome = match &self.backend {
            Backend::Memory(store) => locked_cycle(store, trigger, form)?,
            Backend::Sqlite(store) => locked_cycle(store, trigger, form)?,
            Backend::File(store) => locked_cycle(store, trigger, form)?,
            Backend::Session(registry) => {
                let requested = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
                let (session_id, store) = registry.store_for(requested.as_deref())?;
                let outcome = locked_cycle(&store, trigger, form)?;
                let cookie = Cookie::build((SESSION_COOKIE, session_id))
                    .path("/")
                    .http_only(true);
                return Ok((jar.add(cookie), outcome));
            }
        };
        Ok((jar, outcome))
    }

    /// Loads and projects the current dataset without saving it
    ///
    /// A request without a live session reads a throwaway seeded store, so
    /// no session is opened and no cookie is issued.
    pub fn current(&self, jar: &CookieJar) -> Result<CycleOutcome, DashboardError> {
        let outcome = match &self.backend {
            Backend::Memory(store) => locked_observe(store)?,
            Backend::Sqlite(store) => locked_observe(store)?,
            Backend::File(store) => locked_observe(store)?,
            Backend::Session(registry) => {
                let requested = jar.get(SESSION_COOKIE).map(|c| c.value());
                match registry.existing_store(requested)? {
                    Some(store) => locked_observe(&store)?,
                    None => observe(&mut registry.detached_store())?,
                }
            }
        };
        Ok(outcome)
    }
}

fn locked_observe<S: DatasetStore>(store: &Mutex<S>) -> Result<CycleOutcome, StoreError> {
    let mut store = store.lock().map_err(|_| StoreError::Poisoned)?;
    observe(&mut *store)
}

fn locked_cycle<S: DatasetStore>(
    store: &Mutex<S>,
    trigger: Trigger,
    form: &FormSnapshot,
) -> Result<CycleOutcome, StoreError> {
    let mut store = store.lock().map_err(|_| StoreError::Poisoned)?;
    run_cycle(&mut *store, trigger, form)
}

/// Body of `POST /api/cycle`: the control that fired plus every form value.
#[derive(Debug, Deserialize)]
pub struct CycleRequest {
    #[serde(default)]
    pub trigger: Option<String>,
    #[serde(flatten)]
    pub form: FormSnapshot,
}

/// Builds the dashboard router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/api/dataset", get(get_dataset))
        .route("/api/cycle", post(post_cycle))
        .route("/api/chart.svg", get(get_chart))
        .route("/api/export.csv", get(export_csv))
        .route("/api/export.xlsx", get(export_xlsx))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::from_config(&config)?);

    if let Backend::Session(_) = state.backend() {
        let purge_state = Arc::clone(&state);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60 * 60));
            loop {
                interval.tick().await;
                if let Backend::Session(registry) = purge_state.backend() {
                    match registry.purge_expired() {
                        Ok(0) => {}
                        Ok(n) => log::info!("purged {} expired sessions", n),
                        Err(e) => log::warn!("session purge failed: {}", e),
                    }
                }
            }
        });
    }

    let app = router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr).await?;
    log::info!("listening on http://{} ({} store)", addr, config.store.label());
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_dashboard() -> Html<&'static str> {
    Html(include_str!("./static/dashboard.html"))
}

async fn get_dataset(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, DashboardError> {
    let (jar, outcome) = state.cycle(jar, Trigger::None, &FormSnapshot::default())?;
    Ok((jar, Json(outcome)))
}

async fn post_cycle(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<CycleRequest>,
) -> Result<impl IntoResponse, DashboardError> {
    let trigger = dispatch(request.trigger.as_deref());
    let (jar, outcome) = state.cycle(jar, trigger, &request.form)?;
    Ok((jar, Json(outcome)))
}

async fn get_chart(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, DashboardError> {
    let outcome = state.current(&jar)?;
    let svg = render_scatter_svg(&outcome.view.chart, &GraphOptions::default())?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/svg+xml")],
        svg,
    )
        .into_response())
}

async fn export_csv(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, DashboardError> {
    let outcome = state.current(&jar)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"services.csv\""),
        ],
        downloader::to_csv(&outcome.records),
    )
        .into_response())
}

async fn export_xlsx(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, DashboardError> {
    let outcome = state.current(&jar)?;
    let bytes = downloader::to_xlsx(&outcome.records)?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"services.xlsx\""),
        ],
        bytes,
    )
        .into_response())
}

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRef, Multipart, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Local;
use log::{info, warn};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::auth::{self, AuthContext, SessionKeys};
use crate::checkout::{self, OrderFields, QrRequest};
use crate::config::PortalConfig;
use crate::constants::generate_nonce;
use crate::credentials;
use crate::db::{self, Storage};
use crate::error::PortalError;
use crate::log_sink;
use crate::media;
use crate::models::{MovementInput, NewRecording};
use crate::pages;
use crate::scripts::{self, Script};

type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Uploaded clips are accepted up to this size
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Log records returned by `/get_logs`
const LOG_VIEW_LIMIT: u64 = 200;

/// Application state shared by every handler
pub struct AppState {
    pub storage: Storage,
    pub config: PortalConfig,
    pub session_keys: SessionKeys,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: PortalConfig, storage: Storage, session_secret: &str) -> Self {
        let session_keys = SessionKeys::new(session_secret.as_bytes(), config.auth.session_ttl_hours);
        Self {
            storage,
            config,
            session_keys,
            http_client: reqwest::Client::new(),
        }
    }
}

impl FromRef<Arc<AppState>> for SessionKeys {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.session_keys.clone()
    }
}

/// Build the full route table
pub fn build_router(state: Arc<AppState>) -> Router {
    let media_files: Router = Router::new()
        .nest_service("/recordings", ServeDir::new(&state.config.recordings_dir))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/", get(index_handler))
        .route("/login", get(login_page_handler).post(login_handler))
        .route("/logout", get(logout_handler))
        .route("/health", get(health_handler))
        .route("/show_smiley", get(smiley_handler))
        .route("/run_script_no_args", post(run_script_no_args_handler))
        .route("/run_script_with_args", post(run_script_with_args_handler))
        .route("/record_video", post(record_video_handler))
        .route("/get_videos", get(get_videos_handler))
        .route("/record_movement", post(record_movement_handler))
        .route("/get_movement", get(get_movement_handler))
        .route("/record_message", post(record_message_handler))
        .route("/get_archive", get(get_archive_handler))
        .route("/get_logs", get(get_logs_handler))
        .route("/ecommerce", get(ecommerce_handler))
        .route("/checkout", post(checkout_handler))
        .route("/update_payment", post(update_payment_handler))
        .route("/qr", get(qr_page_handler).post(qr_handler))
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
        .merge(media_files)
}

/// Gate for routes served by a tower service rather than a handler
async fn require_session(_auth: AuthContext, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// Start the portal server (blocks until the server exits)
pub fn serve(config: PortalConfig) -> Result<(), DynError> {
    let credentials = credentials::load_credentials()?;
    let storage = Storage::select(&config, &credentials, |key| std::env::var(key).ok())?;
    log_sink::install(storage.clone(), config.log_queue_capacity)?;

    let session_secret = match &config.auth.session_secret {
        Some(secret) => secret.clone(),
        None => {
            warn!("No session secret configured, sessions will not survive a restart");
            generate_nonce()
        }
    };

    std::fs::create_dir_all(&config.recordings_dir)?;
    std::fs::create_dir_all(&config.static_dir)?;

    let port = config.port;
    info!("Starting portal on port {}", port);
    info!("Storage: {}", storage.describe());
    info!("Recordings directory: {}", config.recordings_dir.display());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let app_state = Arc::new(AppState::new(config, storage, &session_secret));
        let app = build_router(app_state);

        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
            .await
            .map_err(|e| format!("Failed to bind to port {}: {}", port, e))?;
        axum::serve(listener, app)
            .await
            .map_err(|e| format!("Server error: {}", e))?;

        Ok::<(), DynError>(())
    })
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    password: String,
}

async fn login_page_handler() -> Html<String> {
    Html(pages::login(None))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PortalError> {
    if !auth::check(&form.password, &state.config.auth.password_sha3_512) {
        warn!("Rejected login attempt");
        return Ok((
            StatusCode::UNAUTHORIZED,
            Html(pages::login(Some("Invalid password"))),
        )
            .into_response());
    }

    let cookie = state.session_keys.session_cookie()?;
    info!("Login succeeded");
    Ok((jar.add(cookie), Redirect::to("/")).into_response())
}

async fn logout_handler(jar: CookieJar) -> impl IntoResponse {
    (auth::clear_session(jar), Redirect::to("/login"))
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn index_handler(_auth: AuthContext) -> Html<String> {
    Html(pages::dashboard())
}

async fn smiley_handler(_auth: AuthContext) -> Html<String> {
    Html(pages::smiley())
}

// ============================================================================
// Scripts
// ============================================================================

#[derive(Debug, Deserialize)]
struct ScriptArgForm {
    #[serde(default)]
    arg: String,
}

async fn run_script_no_args_handler(
    _auth: AuthContext,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, PortalError> {
    let output = scripts::run(&state.config.scripts, Script::NoArgs, None).await?;
    Ok(Json(json!({ "output": output })))
}

async fn run_script_with_args_handler(
    _auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Form(form): Form<ScriptArgForm>,
) -> Result<Json<serde_json::Value>, PortalError> {
    let output = scripts::run(&state.config.scripts, Script::WithArgs, Some(&form.arg)).await?;
    Ok(Json(json!({ "output": output })))
}

// ============================================================================
// Media capture
// ============================================================================

/// Bytes of the first multipart field called `name`
async fn read_upload(multipart: &mut Multipart, name: &'static str) -> Result<Bytes, PortalError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(name) {
            return Ok(field.bytes().await?);
        }
    }
    Err(PortalError::MissingField(name))
}

async fn record_video_handler(
    _auth: AuthContext,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, PortalError> {
    let data = read_upload(&mut multipart, "video").await?;
    media::store_video(&state.config.recordings_dir, &data, Local::now().naive_local()).await?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn get_videos_handler(
    _auth: AuthContext,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, PortalError> {
    let videos = media::list_videos(&state.config.recordings_dir).await?;
    Ok(Json(json!({ "videos": videos })))
}

async fn record_message_handler(
    _auth: AuthContext,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, PortalError> {
    let data = read_upload(&mut multipart, "audio").await?;
    let now = Local::now().naive_local();
    let message =
        media::capture_message(&state.config.media, &state.config.recordings_dir, &data, now).await?;

    let recording = NewRecording {
        date: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        filename: message.filename.clone(),
        length: message.length,
        transcription: message.transcription.clone(),
    };
    db::save_recording(&state.storage, &recording).await?;

    Ok(Json(json!({
        "status": "ok",
        "length": message.length,
        "transcription": message.transcription,
    })))
}

async fn get_archive_handler(
    _auth: AuthContext,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, PortalError> {
    let records = db::list_recordings(&state.storage).await?;
    Ok(Json(json!({ "records": records })))
}

// ============================================================================
// Telemetry
// ============================================================================

#[derive(Debug, Deserialize)]
struct MovementPayload {
    data: Vec<MovementInput>,
}

async fn record_movement_handler(
    _auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MovementPayload>,
) -> Result<Json<serde_json::Value>, PortalError> {
    let saved = db::save_movement_batch(&state.storage, &payload.data).await?;
    info!("Stored {} movement samples", saved);
    Ok(Json(json!({ "status": "ok" })))
}

async fn get_movement_handler(
    _auth: AuthContext,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, PortalError> {
    let records = db::list_movement(&state.storage).await?;
    Ok(Json(json!({ "records": records })))
}

async fn get_logs_handler(
    _auth: AuthContext,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, PortalError> {
    let records = db::list_logs(&state.storage, LOG_VIEW_LIMIT).await?;
    Ok(Json(json!({ "records": records })))
}

// ============================================================================
// Checkout
// ============================================================================

async fn ecommerce_handler(_auth: AuthContext) -> Html<String> {
    Html(pages::ecommerce())
}

async fn checkout_handler(
    _auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Form(order): Form<OrderFields>,
) -> Result<Html<String>, PortalError> {
    let quote = checkout::checkout(
        &state.storage,
        &state.http_client,
        &state.config.checkout,
        &state.config.static_dir,
        &order,
    )
    .await?;
    Ok(Html(pages::receipt(&quote)))
}

async fn update_payment_handler(
    _auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Json(order): Json<OrderFields>,
) -> Result<Json<serde_json::Value>, PortalError> {
    let quote = checkout::quote(
        &state.http_client,
        &state.config.checkout,
        &state.config.static_dir,
        &order,
    )
    .await?;
    Ok(Json(json!({
        "tx_hash": quote.tx_hash,
        "qr_filename": quote.qr_filename,
        "total_btc": quote.total_btc,
        "btc_rate": quote.btc_rate,
    })))
}

async fn qr_page_handler(_auth: AuthContext) -> Html<String> {
    Html(pages::qr(None, None))
}

async fn qr_handler(
    _auth: AuthContext,
    State(state): State<Arc<AppState>>,
    Form(request): Form<QrRequest>,
) -> Result<Response, PortalError> {
    let content = match request.content() {
        Ok(content) => content,
        Err(message) => {
            return Ok((StatusCode::BAD_REQUEST, Html(pages::qr(None, Some(message)))).into_response())
        }
    };
    let filename = checkout::write_content_qr(&state.config.static_dir, &content).await?;
    info!("Generated {} QR {}", request.qr_type, filename);
    Ok(Html(pages::qr(Some(&filename), None)).into_response())
}

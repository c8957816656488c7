use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::analysis::MotionExerciseCounter;
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::debug::{DebugFrameLog, FrameRecord};
use crate::error::{log_session_error, ErrorCode, SessionError};
use crate::motivation::motivation_text;
use crate::pose::KeypointFrame;
use crate::session::{ExerciseMode, SessionStatus, SessionStore};
use crate::telemetry::{self, DiagnosticError, LifecyclePhase, TelemetrySnapshot};

/// Session id used when the client does not supply one.
const DEFAULT_SESSION_ID: &str = "default";

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct CoachHttpState {
    store: Arc<SessionStore>,
    frame_log: Option<Arc<DebugFrameLog>>,
    started_at: Instant,
}

impl CoachHttpState {
    pub fn new(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let frame_log = if config.debug.save_frames {
            match DebugFrameLog::create(&config.debug.debug_dir) {
                Ok(log) => Some(Arc::new(log)),
                Err(err) => {
                    log::warn!(
                        "Failed to create debug frame directory {:?}: {}. Frame saving disabled.",
                        config.debug.debug_dir,
                        err
                    );
                    None
                }
            }
        } else {
            None
        };

        Self {
            store: Arc::new(SessionStore::new(config.exercises.clone(), clock)),
            frame_log,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn uptime_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

/// HTTP error variants mapped to JSON responses.
#[derive(Debug)]
pub enum HttpServerError {
    BadRequest(&'static str),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<SessionError> for HttpServerError {
    fn from(err: SessionError) -> Self {
        match &err {
            SessionError::UnknownSession { .. } => HttpServerError::NotFound(err.message()),
            SessionError::LockPoisoned { .. } => {
                log_session_error(&err, "http handler");
                telemetry::hub().record_error(DiagnosticError::LockPoisoned, err.message());
                HttpServerError::Internal(err.message())
            }
        }
    }
}

/// Frame analysis request payload.
///
/// `keypoints` carries the detector output for one frame: 17 rows of
/// `[x, y, confidence]`, or `null` when no person was detected upstream.
#[derive(Debug, Deserialize)]
pub struct AnalyzeFrameRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub mode: String,
    pub keypoints: Option<Vec<[f32; 3]>>,
}

/// Session reset request payload.
#[derive(Debug, Default, Deserialize)]
pub struct ResetSessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Query payload for status lookups.
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub session_id: Option<String>,
}

/// Complete workout state returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutState {
    /// Current repetition count
    pub rep_count: u32,
    /// Joint angle for angle-based exercises (degrees)
    pub angle: Option<f32>,
    /// Position description for motion-based exercises
    pub position: Option<String>,
    /// Motivational message for user engagement
    pub motivation: String,
    pub is_workout_active: bool,
    pub is_connected: bool,
    pub error_message: Option<String>,
    /// Total frames processed in session
    pub frames_sent: u64,
    /// Timestamp of this state snapshot (milliseconds since epoch)
    pub last_rep_at: u64,
}

/// Health endpoint response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_ms: u64,
    pub active_sessions: usize,
}

/// Metrics endpoint response payload.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub diagnostics: TelemetrySnapshot,
}

/// Build the Axum router with all handlers.
pub fn build_router(state: CoachHttpState) -> Router {
    Router::new()
        .route("/analyze_frame", post(analyze_frame))
        .route("/reset_session", post(reset_session))
        .route("/health", get(health))
        .route("/status", get(session_status))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Run the HTTP server loop.
pub async fn run_http_server(state: CoachHttpState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding HTTP listener")?;
    let router = build_router(state);
    axum::serve(listener, router)
        .await
        .context("serving HTTP router")?;
    Ok(())
}

/// Core endpoint: analyze one keypoint frame and return the workout state.
pub async fn analyze_frame(
    State(state): State<CoachHttpState>,
    Json(request): Json<AnalyzeFrameRequest>,
) -> Result<Json<WorkoutState>, HttpServerError> {
    let mode = ExerciseMode::parse_or_default(&request.mode);

    let frame = match &request.keypoints {
        Some(rows) => match KeypointFrame::from_rows(rows) {
            Ok(frame) => Some(frame),
            Err(err) => {
                telemetry::hub().record_error(DiagnosticError::MalformedFrame, err.to_string());
                return Err(HttpServerError::BadRequest("malformed keypoint frame"));
            }
        },
        None => None,
    };

    let session_id = request
        .session_id
        .as_deref()
        .unwrap_or(DEFAULT_SESSION_ID)
        .to_string();

    let existed = state.store.get(&session_id)?.is_some();
    let handle = state.store.get_or_create(&session_id, mode)?;
    if !existed {
        telemetry::hub().record_session_event(LifecyclePhase::Created, &session_id);
    }

    let mut session = handle.lock().map_err(|_| {
        HttpServerError::from(SessionError::LockPoisoned {
            component: "WorkoutSession".to_string(),
        })
    })?;

    // Mode changed mid-session: discard the old counter, same as the
    // client walking to a different station
    if session.mode() != mode {
        session.switch_mode(mode);
        telemetry::hub().record_session_event(LifecyclePhase::ModeSwitched, &session_id);
    }

    let started = Instant::now();
    let count_before = session.count();
    let (rep_count, exercise_state) = session.update(frame.as_ref());
    telemetry::hub().record_frame_latency(started.elapsed().as_secs_f32() * 1000.0);

    if rep_count > count_before {
        telemetry::hub().record_rep(mode.as_str(), rep_count);
    }

    if let Some(ref frame_log) = state.frame_log {
        let displacement = match (&frame, mode.is_motion_based()) {
            (Some(frame), true) => MotionExerciseCounter::displacement(frame),
            _ => 0.0,
        };
        frame_log.save(&FrameRecord {
            frame: session.frame_count(),
            mode: mode.as_str().to_string(),
            state: exercise_state.label(),
            rep_count,
            displacement,
        });
    }

    Ok(Json(WorkoutState {
        rep_count,
        angle: exercise_state.angle().map(round_to_tenth),
        position: exercise_state
            .position()
            .map(|position| position.as_str().to_string()),
        motivation: motivation_text(rep_count),
        is_workout_active: true,
        is_connected: true,
        error_message: None,
        frames_sent: session.frame_count(),
        last_rep_at: now_timestamp_ms(),
    }))
}

/// Reset a workout session, optionally changing exercise mode.
pub async fn reset_session(
    State(state): State<CoachHttpState>,
    Json(request): Json<ResetSessionRequest>,
) -> Result<Json<WorkoutState>, HttpServerError> {
    let mode = ExerciseMode::parse_or_default(request.mode.as_deref().unwrap_or("chinup"));
    let session_id = request
        .session_id
        .as_deref()
        .unwrap_or(DEFAULT_SESSION_ID)
        .to_string();

    state.store.replace(&session_id, mode)?;
    telemetry::hub().record_session_event(LifecyclePhase::Reset, &session_id);

    Ok(Json(WorkoutState {
        rep_count: 0,
        angle: None,
        position: None,
        motivation: "Ready to start!".to_string(),
        is_workout_active: false,
        is_connected: true,
        error_message: None,
        frames_sent: 0,
        last_rep_at: now_timestamp_ms(),
    }))
}

pub async fn health(State(state): State<CoachHttpState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_ms: state.uptime_ms(),
        active_sessions: state.store.len(),
    })
}

/// Diagnostic snapshot of one session.
pub async fn session_status(
    State(state): State<CoachHttpState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<SessionStatus>, HttpServerError> {
    let session_id = query.session_id.as_deref().unwrap_or(DEFAULT_SESSION_ID);

    let handle = state
        .store
        .get(session_id)?
        .ok_or_else(|| SessionError::UnknownSession {
            id: session_id.to_string(),
        })?;

    let session = handle.lock().map_err(|_| {
        HttpServerError::from(SessionError::LockPoisoned {
            component: "WorkoutSession".to_string(),
        })
    })?;
    Ok(Json(session.status()))
}

pub async fn metrics(State(_state): State<CoachHttpState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        diagnostics: telemetry::hub().snapshot(),
    })
}

fn round_to_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

fn now_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

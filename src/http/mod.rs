//! HTTP service layer.
//!
//! Thin Axum surface over the session store: frame analysis, session
//! reset, health, per-session status, and telemetry snapshots. All
//! endpoints are plain JSON; the heavy lifting stays in `analysis` and
//! `session`.

mod routes;

pub use routes::{
    build_router, run_http_server, AnalyzeFrameRequest, CoachHttpState, HealthResponse,
    HttpServerError, MetricsResponse, ResetSessionRequest, WorkoutState,
};

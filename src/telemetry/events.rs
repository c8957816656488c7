//! Telemetry event payloads.

use serde::{Deserialize, Serialize};

/// Session lifecycle phases tracked for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    Created,
    ModeSwitched,
    Reset,
}

/// Error categories surfaced through telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticError {
    MalformedFrame,
    LockPoisoned,
    DebugSinkFailure,
}

/// One metric event published to the telemetry hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricEvent {
    /// A repetition was counted
    RepCompleted {
        mode: String,
        count: u32,
        timestamp_ms: u64,
    },
    /// Rolling frame-processing latency
    FrameLatency {
        avg_ms: f32,
        max_ms: f32,
        sample_count: usize,
    },
    /// A session was created, switched modes, or reset
    SessionLifecycle {
        phase: LifecyclePhase,
        session: String,
        timestamp_ms: u64,
    },
    /// A request-level error occurred
    Error {
        code: DiagnosticError,
        context: String,
    },
}

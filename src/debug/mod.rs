// Debug tooling
//
// Frame-record persistence for development sessions. Enabled through
// DebugConfig; entirely inert in normal operation.

pub mod frame_log;

pub use frame_log::{DebugFrameLog, FrameRecord};

// Fitness Coach Core - Rust exercise analysis engine
// Streaming keypoint analysis with per-exercise repetition state machines

// Module declarations
pub mod analysis;
pub mod clock;
pub mod config;
pub mod debug;
pub mod error;
pub mod http;
pub mod motivation;
pub mod pose;
pub mod session;
pub mod telemetry;
pub mod testing;

// Re-exports for convenience
pub use analysis::{CounterStatus, ExerciseCounter, ExerciseState, Position};
pub use session::{ExerciseMode, WorkoutSession};

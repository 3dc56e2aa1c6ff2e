//! Cost-aware request router for hybrid local/ternary/cloud LLM inference.
//!
//! Estimates prompt complexity on a 0-1 scale, selects the cheapest backend
//! authorized for that complexity, executes the call through the matching
//! tier strategy, and records cost/latency outcomes. Ternary runtimes are
//! probed once at startup and their failures fall back to cloud
//! transparently.
//!
//! The library surface is [`SmartRouter`]: `estimate`, `route`, `process`,
//! `process_with_override`, `stats`. HTTP front doors and metrics exporters
//! are expected to be thin consumers of that surface.

pub mod backends;
pub mod config;
pub mod error;
pub mod recorder;
pub mod router;

pub use backends::{Backend, ExecutionResult, RoutingMetadata};
pub use config::RouterConfig;
pub use error::{ConfigError, Error, ExecutionError, RecorderError};
pub use recorder::{
    InMemoryRecorder, NoopRecorder, OutcomeRecorder, RoutingRecord, RoutingStats,
};
pub use router::{
    profile, profiles, BackendProfile, ComplexityAssessment, RoutingDecision, SmartRouter, Tier,
};

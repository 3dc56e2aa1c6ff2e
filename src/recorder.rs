//! Routing outcome recording.
//!
//! A narrow sink/source seam for routing decisions: the orchestrator writes
//! one record per request (fire-and-forget) and reads aggregate counts back
//! for `stats`. Durable sinks plug in behind the same trait; the default is
//! an in-memory store and there is a no-op for running without one.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RecorderError;
use crate::router::Tier;

/// One routing decision summary, appended per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingRecord {
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub tier: Tier,
    pub complexity: f64,
    pub estimated_cost: Decimal,
    /// Realized cost reported by the executor.
    pub cost: Decimal,
    pub latency: Duration,
}

/// Aggregate routing statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingStats {
    pub total_requests: u64,
    pub local_requests: u64,
    pub ternary_requests: u64,
    pub cloud_requests: u64,
    /// Share of requests served by free tiers (local + ternary), 0-100.
    pub local_percentage: f64,
    pub total_cost: Decimal,
}

/// Durable (or not) store for routing outcomes.
#[async_trait]
pub trait OutcomeRecorder: Send + Sync {
    /// Append one routing-decision summary.
    async fn record(&self, record: &RoutingRecord) -> Result<(), RecorderError>;

    /// Aggregate counts over everything recorded so far.
    async fn aggregate(&self) -> Result<RoutingStats, RecorderError>;
}

/// Default recorder: keeps records in memory for the process lifetime.
#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    records: Mutex<Vec<RoutingRecord>>,
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OutcomeRecorder for InMemoryRecorder {
    async fn record(&self, record: &RoutingRecord) -> Result<(), RecorderError> {
        self.records
            .lock()
            .map_err(|e| RecorderError::WriteFailed(e.to_string()))?
            .push(record.clone());
        Ok(())
    }

    async fn aggregate(&self) -> Result<RoutingStats, RecorderError> {
        let records = self
            .records
            .lock()
            .map_err(|e| RecorderError::Unavailable(e.to_string()))?;

        let mut stats = RoutingStats::default();
        for r in records.iter() {
            stats.total_requests += 1;
            match r.tier {
                Tier::Local => stats.local_requests += 1,
                Tier::Ternary => stats.ternary_requests += 1,
                Tier::Cloud => stats.cloud_requests += 1,
            }
            stats.total_cost += r.cost;
        }
        if stats.total_requests > 0 {
            let free = stats.local_requests + stats.ternary_requests;
            stats.local_percentage = free as f64 / stats.total_requests as f64 * 100.0;
        }
        Ok(stats)
    }
}

/// Recorder for running without an outcome store: writes succeed and
/// aggregates are zero-valued.
#[derive(Debug, Default)]
pub struct NoopRecorder;

#[async_trait]
impl OutcomeRecorder for NoopRecorder {
    async fn record(&self, _record: &RoutingRecord) -> Result<(), RecorderError> {
        Ok(())
    }

    async fn aggregate(&self) -> Result<RoutingStats, RecorderError> {
        Ok(RoutingStats::default())
    }
}

//! Routing & dispatch engine.
//!
//! Composes the pure pieces (complexity estimation, model selection, cost
//! estimation) with the per-tier execution strategies: estimate -> select ->
//! estimate cost -> execute -> attach routing metadata -> record outcome.
//! All decision logic lives here and in the submodules; transport layers are
//! thin consumers of [`SmartRouter`].

pub mod complexity;
pub mod costs;
pub mod selector;

pub use complexity::ComplexityAssessment;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::sync::LazyLock as Lazy;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::backends::{
    ternary, Backend, CloudBackend, ExecutionResult, LocalBackend, RoutingMetadata,
    TernaryBackend,
};
use crate::config::RouterConfig;
use crate::error::{Error, ExecutionError};
use crate::recorder::{OutcomeRecorder, RoutingRecord, RoutingStats};
use selector::CLAUDE_SONNET;

// ---------------------------------------------------------------------------
// Backend tiers and profiles
// ---------------------------------------------------------------------------

/// A class of backend sharing a cost/capability profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Local,
    Ternary,
    Cloud,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Local => write!(f, "local"),
            Tier::Ternary => write!(f, "ternary"),
            Tier::Cloud => write!(f, "cloud"),
        }
    }
}

/// Static per-backend configuration.
#[derive(Debug, Clone)]
pub struct BackendProfile {
    pub name: &'static str,
    pub tier: Tier,
    /// Highest complexity this backend is authorized to handle.
    pub max_complexity: f64,
    /// Per-token cost. Zero for local and ternary tiers.
    pub cost_per_token: Decimal,
}

static PROFILES: Lazy<Vec<BackendProfile>> = Lazy::new(|| {
    vec![
        bp(selector::TINYLLAMA, Tier::Local, 0.3, Decimal::ZERO),
        bp(selector::PHI2, Tier::Local, 0.6, Decimal::ZERO),
        bp(selector::BITNET_2B, Tier::Ternary, 0.5, Decimal::ZERO),
        bp(selector::MISTRAL_7B_TERNARY, Tier::Ternary, 0.8, Decimal::ZERO),
        // $3 per 1M tokens
        bp(selector::CLAUDE_SONNET, Tier::Cloud, 1.0, dec!(0.000003)),
    ]
});

fn bp(name: &'static str, tier: Tier, max_complexity: f64, cost_per_token: Decimal) -> BackendProfile {
    BackendProfile {
        name,
        tier,
        max_complexity,
        cost_per_token,
    }
}

/// Look up a backend profile by model name.
pub fn profile(name: &str) -> Option<&'static BackendProfile> {
    PROFILES.iter().find(|p| p.name == name)
}

/// All known backend profiles.
pub fn profiles() -> &'static [BackendProfile] {
    PROFILES.as_slice()
}

// ---------------------------------------------------------------------------
// Routing decision
// ---------------------------------------------------------------------------

/// The result of routing one request. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub model: String,
    pub tier: Tier,
    pub complexity: f64,
    pub estimated_cost: Decimal,
    pub reasoning: String,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Cost-aware request router.
///
/// Shared state is read-only after construction except the probed ternary
/// availability flag, so a single instance can serve concurrent requests
/// through `&self`.
pub struct SmartRouter {
    config: RouterConfig,
    ternary_available: AtomicBool,
    local: LocalBackend,
    ternary: TernaryBackend,
    cloud: Option<Arc<CloudBackend>>,
    recorder: Arc<dyn OutcomeRecorder>,
}

impl SmartRouter {
    /// Build a router, probing the ternary runtime once.
    pub async fn connect(config: RouterConfig, recorder: Arc<dyn OutcomeRecorder>) -> Self {
        let ternary_available = config.use_ternary
            && ternary::probe(&config.ternary_url, config.probe_timeout).await;
        if config.use_ternary {
            if ternary_available {
                tracing::info!("ternary runtime detected and available");
            } else {
                tracing::info!("ternary runtime not available, using standard models");
            }
        }
        Self::with_ternary_availability(config, recorder, ternary_available)
    }

    /// Build a router with a pre-established ternary availability flag.
    pub fn with_ternary_availability(
        config: RouterConfig,
        recorder: Arc<dyn OutcomeRecorder>,
        ternary_available: bool,
    ) -> Self {
        let cloud = config.anthropic_api_key.clone().map(|key| {
            let rate = profile(CLAUDE_SONNET)
                .expect("cloud profile must be cataloged")
                .cost_per_token;
            let mut backend = CloudBackend::new(key, rate, config.request_timeout);
            if let Some(base) = &config.anthropic_base_url {
                backend = backend.with_base_url(base.clone());
            }
            Arc::new(backend)
        });
        if cloud.is_none() {
            tracing::warn!("ANTHROPIC_API_KEY not set - cloud routing disabled");
        }

        let local = LocalBackend::new(config.ollama_url.clone(), config.request_timeout);
        let ternary = TernaryBackend::new(
            config.ternary_url.clone(),
            config.request_timeout,
            cloud.clone(),
        );

        Self {
            config,
            ternary_available: AtomicBool::new(ternary_available),
            local,
            ternary,
            cloud,
            recorder,
        }
    }

    /// Whether the ternary runtime was live at the last probe.
    pub fn ternary_available(&self) -> bool {
        self.ternary_available.load(Ordering::Relaxed)
    }

    /// Re-run the ternary liveness probe and refresh the cached flag.
    pub async fn reprobe_ternary(&self) -> bool {
        let available = self.config.use_ternary
            && ternary::probe(&self.config.ternary_url, self.config.probe_timeout).await;
        self.ternary_available.store(available, Ordering::Relaxed);
        available
    }

    /// Estimate prompt complexity without routing or executing.
    pub fn estimate(&self, prompt: &str) -> ComplexityAssessment {
        complexity::estimate(prompt)
    }

    /// Decide which backend should handle a prompt.
    pub fn route(&self, prompt: &str) -> RoutingDecision {
        let assessment = complexity::estimate(prompt);
        let name = selector::select(
            assessment.score,
            self.config.use_local,
            self.ternary_available(),
        );
        let mut selected = profile(name).expect("selector only returns cataloged models");

        // Exactly one backend per request, and it must be authorized for the
        // assessed complexity; the highest tier is the ultimate fallback.
        if selected.max_complexity < assessment.score {
            selected = profile(CLAUDE_SONNET).expect("cloud profile must be cataloged");
        }

        let estimated_cost = costs::estimate_cost(prompt, selected);

        tracing::info!(
            model = selected.name,
            tier = %selected.tier,
            complexity = assessment.score,
            cost = %estimated_cost,
            "routing decision"
        );

        RoutingDecision {
            model: selected.name.to_string(),
            tier: selected.tier,
            complexity: assessment.score,
            estimated_cost,
            reasoning: assessment.reasoning(),
        }
    }

    /// Route and execute one prompt, attaching routing metadata to the result.
    pub async fn process(&self, prompt: &str) -> Result<ExecutionResult, Error> {
        let decision = self.route(prompt);
        let mut result = self.dispatch(&decision.model, decision.tier, prompt).await?;
        result.routing = Some(RoutingMetadata {
            complexity: decision.complexity,
            reasoning: decision.reasoning.clone(),
            estimated_cost: decision.estimated_cost,
        });
        self.record_outcome(&decision, &result).await;
        Ok(result)
    }

    /// Execute against an explicitly named backend, skipping estimation.
    ///
    /// Unknown names are rejected before any network call.
    pub async fn process_with_override(
        &self,
        prompt: &str,
        backend: &str,
    ) -> Result<ExecutionResult, Error> {
        let selected =
            profile(backend).ok_or_else(|| ExecutionError::UnknownBackend(backend.to_string()))?;

        let decision = RoutingDecision {
            model: selected.name.to_string(),
            tier: selected.tier,
            complexity: 0.0,
            estimated_cost: costs::estimate_cost(prompt, selected),
            reasoning: "manual selection".to_string(),
        };

        let mut result = self.dispatch(&decision.model, decision.tier, prompt).await?;
        result.routing = Some(RoutingMetadata {
            complexity: decision.complexity,
            reasoning: decision.reasoning.clone(),
            estimated_cost: decision.estimated_cost,
        });
        self.record_outcome(&decision, &result).await;
        Ok(result)
    }

    /// Aggregate routing statistics, degrading to zero-valued stats if the
    /// recorder is unavailable.
    pub async fn stats(&self) -> RoutingStats {
        match self.recorder.aggregate().await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::debug!(error = %e, "stats aggregation failed");
                RoutingStats::default()
            }
        }
    }

    /// Dispatch to the execution strategy matching the tier tag.
    async fn dispatch(
        &self,
        model: &str,
        tier: Tier,
        prompt: &str,
    ) -> Result<ExecutionResult, ExecutionError> {
        match tier {
            Tier::Local => self.local.execute(model, prompt).await,
            Tier::Ternary => self.ternary.execute(model, prompt).await,
            Tier::Cloud => match &self.cloud {
                Some(cloud) => cloud.execute(model, prompt).await,
                None => Err(ExecutionError::CloudNotConfigured),
            },
        }
    }

    /// Fire-and-forget outcome recording. Failures are logged, never surfaced.
    async fn record_outcome(&self, decision: &RoutingDecision, result: &ExecutionResult) {
        let record = RoutingRecord {
            timestamp: chrono::Utc::now(),
            // The executed backend, which differs from the decision after a
            // ternary -> cloud fallback.
            model: result.model.clone(),
            tier: result.tier,
            complexity: decision.complexity,
            estimated_cost: decision.estimated_cost,
            cost: result.cost,
            latency: result.latency,
        };
        if let Err(e) = self.recorder.record(&record).await {
            tracing::debug!(error = %e, "outcome recording failed");
        }
    }
}

impl std::fmt::Debug for SmartRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartRouter")
            .field("use_local", &self.config.use_local)
            .field("ternary_available", &self.ternary_available())
            .field("cloud_configured", &self.cloud.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecorderError;
    use crate::recorder::InMemoryRecorder;
    use async_trait::async_trait;

    fn standard_router() -> SmartRouter {
        SmartRouter::with_ternary_availability(
            RouterConfig::default(),
            Arc::new(InMemoryRecorder::new()),
            false,
        )
    }

    fn ternary_router() -> SmartRouter {
        SmartRouter::with_ternary_availability(
            RouterConfig::default(),
            Arc::new(InMemoryRecorder::new()),
            true,
        )
    }

    #[test]
    fn simple_question_routes_to_smallest_local() {
        let decision = standard_router().route("What is Python?");
        assert_eq!(decision.model, selector::TINYLLAMA);
        assert_eq!(decision.tier, Tier::Local);
        assert!(decision.complexity < 0.3);
        assert_eq!(decision.estimated_cost, Decimal::ZERO);
    }

    #[test]
    fn explanation_routes_to_mid_tier_local() {
        let decision =
            standard_router().route("Explain the difference between Python lists and tuples.");
        assert_eq!(decision.model, selector::PHI2);
        assert!((0.3..=0.6).contains(&decision.complexity));
    }

    #[test]
    fn long_code_prompt_routes_to_cloud_with_positive_cost() {
        let prompt = format!(
            "Implement a streaming parser. ```\nfn parse(input: &[u8]) {{ }}\n``` {}",
            "It must handle chunked input and resume across buffer boundaries. ".repeat(10)
        );
        assert!(prompt.chars().count() > 500);
        let decision = standard_router().route(&prompt);
        assert_eq!(decision.model, selector::CLAUDE_SONNET);
        assert_eq!(decision.tier, Tier::Cloud);
        assert!(decision.complexity > 0.6);
        assert!(decision.estimated_cost > Decimal::ZERO);
    }

    #[test]
    fn empty_prompt_routes_to_smallest_local() {
        let decision = standard_router().route("");
        assert_eq!(decision.complexity, 0.1);
        assert_eq!(decision.model, selector::TINYLLAMA);
        assert_eq!(decision.estimated_cost, Decimal::ZERO);
    }

    #[test]
    fn ternary_policy_selects_small_ternary_for_medium_score() {
        // "Explain the difference ..." assesses at 0.3-0.5
        let decision =
            ternary_router().route("Explain the difference between Python lists and tuples.");
        assert_eq!(decision.model, selector::BITNET_2B);
        assert_eq!(decision.tier, Tier::Ternary);
        assert_eq!(decision.estimated_cost, Decimal::ZERO);
    }

    #[test]
    fn local_disabled_routes_everything_to_cloud() {
        let router = SmartRouter::with_ternary_availability(
            RouterConfig {
                use_local: false,
                ..RouterConfig::default()
            },
            Arc::new(InMemoryRecorder::new()),
            false,
        );
        let decision = router.route("What is Python?");
        assert_eq!(decision.model, selector::CLAUDE_SONNET);
    }

    #[test]
    fn selected_backend_always_covers_assessed_complexity() {
        for i in 0..=100 {
            let score = i as f64 / 100.0;
            for (use_local, ternary) in [(true, false), (false, false), (true, true)] {
                let name = selector::select(score, use_local, ternary);
                let p = profile(name).unwrap();
                assert!(
                    p.max_complexity >= score,
                    "{name} (max {}) selected for score {score}",
                    p.max_complexity
                );
            }
        }
    }

    #[test]
    fn routing_is_deterministic() {
        let router = standard_router();
        let first = router.route("Summarize this article");
        for _ in 0..5 {
            let next = router.route("Summarize this article");
            assert_eq!(next.model, first.model);
            assert_eq!(next.complexity, first.complexity);
        }
    }

    #[tokio::test]
    async fn unknown_override_rejected_before_any_call() {
        let err = standard_router()
            .process_with_override("hello", "gpt-7-ultra")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Execution(ExecutionError::UnknownBackend(ref name)) if name == "gpt-7-ultra"
        ));
    }

    #[tokio::test]
    async fn cloud_without_credentials_fails_fast() {
        let err = standard_router()
            .process_with_override("hello", selector::CLAUDE_SONNET)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Execution(ExecutionError::CloudNotConfigured)
        ));
    }

    struct FailingRecorder;

    #[async_trait]
    impl OutcomeRecorder for FailingRecorder {
        async fn record(&self, _: &RoutingRecord) -> Result<(), RecorderError> {
            Err(RecorderError::Unavailable("down".into()))
        }
        async fn aggregate(&self) -> Result<RoutingStats, RecorderError> {
            Err(RecorderError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn stats_degrade_to_zero_when_recorder_unavailable() {
        let router = SmartRouter::with_ternary_availability(
            RouterConfig::default(),
            Arc::new(FailingRecorder),
            false,
        );
        assert_eq!(router.stats().await, RoutingStats::default());
    }

    #[test]
    fn catalog_has_exactly_one_cloud_profile() {
        let clouds: Vec<_> = profiles().iter().filter(|p| p.tier == Tier::Cloud).collect();
        assert_eq!(clouds.len(), 1);
        assert_eq!(clouds[0].max_complexity, 1.0);
        assert!(clouds[0].cost_per_token > Decimal::ZERO);
    }

    #[test]
    fn free_tiers_have_zero_rate() {
        for p in profiles().iter().filter(|p| p.tier != Tier::Cloud) {
            assert_eq!(p.cost_per_token, Decimal::ZERO, "{} must be free", p.name);
        }
    }
}

//! Cost estimation for routed requests.
//!
//! Local and ternary backends are free; metered backends are priced per
//! token with a coarse 4-characters-per-token heuristic for the prompt and
//! a fixed assumed response length. Executors report the authoritative cost
//! after the fact, which may differ from this estimate.

use rust_decimal::Decimal;

use crate::router::{BackendProfile, Tier};

/// Assumed response length (tokens) when estimating cost up front.
pub const ASSUMED_RESPONSE_TOKENS: u64 = 500;

/// Estimate a prompt's token count (4 chars per token, rounded up).
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}

/// Estimate the monetary cost of running `prompt` on `profile`.
pub fn estimate_cost(prompt: &str, profile: &BackendProfile) -> Decimal {
    if profile.tier != Tier::Cloud {
        return Decimal::ZERO;
    }
    let total_tokens = estimate_tokens(prompt) + ASSUMED_RESPONSE_TOKENS;
    Decimal::from(total_tokens) * profile.cost_per_token
}

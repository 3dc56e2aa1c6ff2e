//! Tiered model selection policy.
//!
//! Two mutually exclusive policies keyed on ternary availability. Ternary
//! backends are free and fast, so their policy widens the complexity band
//! eligible for free execution; the standard policy is more conservative
//! with only two free tiers below cloud.

/// Smallest local model, for trivial prompts.
pub const TINYLLAMA: &str = "tinyllama";
/// Mid-tier local model.
pub const PHI2: &str = "phi2";
/// Small ternary (1.58-bit) model.
pub const BITNET_2B: &str = "bitnet-2b";
/// Larger ternary model, 7B quality at a fraction of the memory.
pub const MISTRAL_7B_TERNARY: &str = "mistral-7b-ternary";
/// Metered cloud model, the ultimate fallback.
pub const CLAUDE_SONNET: &str = "claude-sonnet";

/// Select the optimal model for a complexity score.
///
/// Deterministic and total: every score maps to exactly one model.
pub fn select(score: f64, use_local: bool, ternary_available: bool) -> &'static str {
    if ternary_available {
        if score < 0.5 {
            BITNET_2B
        } else if score < 0.8 {
            MISTRAL_7B_TERNARY
        } else {
            CLAUDE_SONNET
        }
    } else if !use_local || score > 0.6 {
        CLAUDE_SONNET
    } else if score < 0.3 {
        TINYLLAMA
    } else {
        PHI2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_policy_tiers() {
        assert_eq!(select(0.0, true, false), TINYLLAMA);
        assert_eq!(select(0.2, true, false), TINYLLAMA);
        assert_eq!(select(0.3, true, false), PHI2);
        assert_eq!(select(0.5, true, false), PHI2);
        assert_eq!(select(0.6, true, false), PHI2);
        assert_eq!(select(0.61, true, false), CLAUDE_SONNET);
        assert_eq!(select(1.0, true, false), CLAUDE_SONNET);
    }

    #[test]
    fn local_disabled_always_selects_cloud() {
        for score in [0.0, 0.3, 0.6, 1.0] {
            assert_eq!(select(score, false, false), CLAUDE_SONNET);
        }
    }

    #[test]
    fn ternary_policy_widens_free_band() {
        assert_eq!(select(0.4, true, true), BITNET_2B);
        assert_eq!(select(0.5, true, true), MISTRAL_7B_TERNARY);
        assert_eq!(select(0.79, true, true), MISTRAL_7B_TERNARY);
        assert_eq!(select(0.8, true, true), CLAUDE_SONNET);
    }

    #[test]
    fn selection_is_deterministic() {
        for i in 0..=100 {
            let score = i as f64 / 100.0;
            let first = select(score, true, true);
            for _ in 0..5 {
                assert_eq!(select(score, true, true), first);
            }
        }
    }
}

//! Prompt complexity estimation.
//!
//! Pure additive scoring over four factors (length, keywords, code
//! likelihood, form), clamped to [0, 1]. Runs in <1ms with no external
//! calls and never fails: empty input is valid and lands in the lowest
//! length bucket.

use std::sync::LazyLock as Lazy;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Keywords that signal a demanding task.
static COMPLEX_KEYWORDS: &[&str] = &[
    "analyze", "design", "architect", "implement", "refactor",
    "optimize", "debug", "explain", "difference", "comprehensive",
    "write code", "create function", "build", "develop",
];

/// Keywords that signal a cheap task.
static SIMPLE_KEYWORDS: &[&str] = &[
    "summarize", "list", "what is", "define", "yes or no",
    "classify", "categorize", "is this", "true or false",
];

static CODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"```",
        r"\bdef\b",
        r"\bclass\b",
        r"\bfunction\b",
        r"\bimport\b",
        r"\bfrom\b",
        r"[{}\[\]();]",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern must compile"))
    .collect()
});

/// Complexity assessment for a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityAssessment {
    /// Normalized complexity score in [0, 1].
    pub score: f64,
    /// Ordered factor labels that contributed to the score.
    pub factors: Vec<String>,
}

impl ComplexityAssessment {
    /// Human-readable explanation of the score.
    pub fn reasoning(&self) -> String {
        format!("Complexity {:.2}: {}", self.score, self.factors.join(", "))
    }
}

/// Estimate prompt complexity on a 0-1 scale.
pub fn estimate(prompt: &str) -> ComplexityAssessment {
    // Empty input gets the lowest length bucket and nothing else.
    if prompt.is_empty() {
        return ComplexityAssessment {
            score: 0.1,
            factors: vec!["short prompt".to_string()],
        };
    }

    let mut factors = Vec::new();
    let mut score = 0.0;

    // Factor 1: length (longer = more complex). Counted in chars so
    // multibyte prompts bucket the same as their ASCII equivalents.
    let length = prompt.chars().count();
    score += if length < 100 {
        factors.push("short prompt".to_string());
        0.1
    } else if length < 500 {
        factors.push("medium length".to_string());
        0.3
    } else {
        factors.push("long prompt".to_string());
        0.5
    };

    // Factor 2: task keywords
    let lower = prompt.to_lowercase();
    let complex_count = COMPLEX_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();
    let simple_count = SIMPLE_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();

    score += if complex_count > 0 {
        factors.push(format!("{complex_count} complex keywords"));
        (complex_count as f64 * 0.1).min(0.3)
    } else if simple_count > 0 {
        factors.push("simple task keywords".to_string());
        -0.1
    } else {
        factors.push("neutral keywords".to_string());
        0.1
    };

    // Factor 3: code detection (distinct pattern categories)
    let code_matches = CODE_PATTERNS.iter().filter(|re| re.is_match(prompt)).count();
    if code_matches >= 2 {
        factors.push("contains code".to_string());
        score += 0.3;
    }

    // Factor 4: questions vs. instructions
    let question_count = prompt.matches('?').count();
    if (1..=2).contains(&question_count) {
        factors.push("simple question".to_string());
        score += -0.1;
    } else if lower.contains("create") || lower.contains("build") {
        factors.push("creative task".to_string());
        score += 0.2;
    }

    ComplexityAssessment {
        score: score.clamp(0.0, 1.0),
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_question_scores_low() {
        let assessment = estimate("What is Python?");
        assert!(
            assessment.score < 0.3,
            "simple question should score below 0.3, got {}",
            assessment.score
        );
    }

    #[test]
    fn explanation_scores_medium() {
        let assessment = estimate("Explain the difference between Python lists and tuples.");
        assert!(
            (0.3..=0.6).contains(&assessment.score),
            "explanation should land in the medium band, got {}",
            assessment.score
        );
    }

    #[test]
    fn long_code_request_scores_high() {
        let prompt = format!(
            "Implement a binary search tree with insert(), delete() and search() methods. \
             ```\nfn insert(&mut self, key: u64) {{ }}\n``` {}",
            "The tree must stay balanced under adversarial insertion order. ".repeat(8)
        );
        assert!(prompt.chars().count() > 500);
        let assessment = estimate(&prompt);
        assert!(
            assessment.score > 0.6,
            "long code request should score above 0.6, got {}",
            assessment.score
        );
    }

    #[test]
    fn score_always_in_unit_interval() {
        let repeated = "create build ".repeat(500);
        let prompts = [
            "",
            "hi",
            "???",
            "analyze design implement optimize debug build develop ```{}();```",
            repeated.as_str(),
        ];
        for p in prompts {
            let a = estimate(p);
            assert!((0.0..=1.0).contains(&a.score), "score {} out of range for {p:?}", a.score);
        }
    }

    #[test]
    fn code_fence_never_decreases_score() {
        let prompts = [
            "What is a variable?",
            "Explain the difference between lists and tuples.",
            "Summarize this paragraph",
        ];
        for p in prompts {
            let plain = estimate(p).score;
            let fenced = estimate(&format!("{p} ```python\nx = 5\n```")).score;
            assert!(
                fenced >= plain,
                "appending a code fence dropped the score for {p:?}: {plain} -> {fenced}"
            );
        }
    }

    #[test]
    fn length_buckets_count_chars_not_bytes() {
        // 99 chars but 198 bytes: must stay in the short bucket.
        let multibyte = "é".repeat(99);
        let ascii = "a".repeat(99);
        let a = estimate(&multibyte);
        let b = estimate(&ascii);
        assert!(a.factors.contains(&"short prompt".to_string()));
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn empty_prompt_scores_one_tenth() {
        let assessment = estimate("");
        assert_eq!(assessment.score, 0.1);
        assert_eq!(assessment.factors, vec!["short prompt".to_string()]);
    }

    #[test]
    fn keyword_factor_caps_at_three_tenths() {
        // Six complex keywords, but the keyword factor saturates at 0.3.
        let a = estimate("analyze design implement optimize debug develop");
        let with_more = estimate("analyze design implement optimize debug develop refactor architect");
        assert_eq!(a.score, with_more.score);
    }

    #[test]
    fn reasoning_lists_factors_in_order() {
        let a = estimate("What is Python?");
        let reasoning = a.reasoning();
        assert!(reasoning.starts_with("Complexity 0."));
        assert!(reasoning.contains("short prompt"));
        assert!(reasoning.contains("simple question"));
    }

    #[test]
    fn estimate_is_deterministic() {
        let p = "Design and implement a comprehensive caching layer?";
        let a = estimate(p);
        for _ in 0..10 {
            let b = estimate(p);
            assert_eq!(a.score, b.score);
            assert_eq!(a.factors, b.factors);
        }
    }
}

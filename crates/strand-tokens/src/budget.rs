//! Context budget health.
//!
//! Classifies estimated token usage against the configured ceiling into an
//! ok/warning/critical tier. Truncation is signalled at the warning
//! threshold, before the hard limit would reject a send.

use serde::{Deserialize, Serialize};
use strand_settings::ContextSettings;

// ─────────────────────────────────────────────────────────────────────────────
// Health tier
// ─────────────────────────────────────────────────────────────────────────────

/// Coarse classification of budget consumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthTier {
    /// Below the warning threshold.
    Ok,
    /// At or above the warning threshold.
    Warning,
    /// At or above the critical threshold.
    Critical,
}

// ─────────────────────────────────────────────────────────────────────────────
// Budget status
// ─────────────────────────────────────────────────────────────────────────────

/// Budget health derived from an estimate and configured limits.
///
/// Transient like the report it is derived from; recomputed every turn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    /// Estimated tokens in the history.
    pub total_tokens: u32,
    /// Configured hard ceiling.
    pub limit_tokens: u32,
    /// `total / limit` as a ratio (may exceed 1.0).
    pub percent_used: f64,
    /// Health classification.
    pub tier: HealthTier,
    /// Whether the truncator should run before the next send.
    pub should_truncate: bool,
}

/// Assess budget health for an estimated total against configured limits.
///
/// A zero limit is degenerate and classifies as critical.
#[must_use]
pub fn assess(total_tokens: u32, context: &ContextSettings) -> BudgetStatus {
    let limit = context.max_context_tokens;
    let percent_used = if limit == 0 {
        1.0
    } else {
        f64::from(total_tokens) / f64::from(limit)
    };

    let tier = if percent_used >= context.critical_threshold {
        HealthTier::Critical
    } else if percent_used >= context.warning_threshold {
        HealthTier::Warning
    } else {
        HealthTier::Ok
    };

    BudgetStatus {
        total_tokens,
        limit_tokens: limit,
        percent_used,
        tier,
        should_truncate: percent_used >= context.warning_threshold,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn context(limit: u32, warning: f64, critical: f64) -> ContextSettings {
        ContextSettings {
            max_context_tokens: limit,
            warning_threshold: warning,
            critical_threshold: critical,
            ..ContextSettings::default()
        }
    }

    #[test]
    fn ok_below_warning() {
        let status = assess(50_000, &context(100_000, 0.70, 0.85));
        assert_eq!(status.tier, HealthTier::Ok);
        assert!(!status.should_truncate);
        assert!((status.percent_used - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn warning_at_exact_threshold() {
        let status = assess(70_000, &context(100_000, 0.70, 0.85));
        assert_eq!(status.tier, HealthTier::Warning);
        assert!(status.should_truncate);
    }

    #[test]
    fn critical_at_exact_threshold() {
        let status = assess(85_000, &context(100_000, 0.70, 0.85));
        assert_eq!(status.tier, HealthTier::Critical);
        assert!(status.should_truncate);
    }

    #[test]
    fn critical_over_limit() {
        let status = assess(120_000, &context(100_000, 0.70, 0.85));
        assert_eq!(status.tier, HealthTier::Critical);
        assert!(status.percent_used > 1.0);
    }

    #[test]
    fn just_below_warning_is_ok() {
        let status = assess(69_999, &context(100_000, 0.70, 0.85));
        assert_eq!(status.tier, HealthTier::Ok);
        assert!(!status.should_truncate);
    }

    #[test]
    fn zero_limit_is_critical() {
        let status = assess(10, &context(0, 0.70, 0.85));
        assert_eq!(status.tier, HealthTier::Critical);
        assert!(status.should_truncate);
        assert!((status.percent_used - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_usage_is_ok() {
        let status = assess(0, &context(100_000, 0.70, 0.85));
        assert_eq!(status.tier, HealthTier::Ok);
        assert!((status.percent_used).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_with_camel_case() {
        let status = assess(1, &context(100, 0.70, 0.85));
        let json = serde_json::to_value(status).unwrap();
        assert!(json.get("percentUsed").is_some());
        assert!(json.get("shouldTruncate").is_some());
        assert_eq!(json["tier"], "ok");
    }
}

//! Quality score and its bucketing.
//!
//! Every rule carries a singleton on the 0–100 score axis.  The score is
//! the strength-weighted average of the singletons of all fired rules:
//!
//! ```text
//!   score = Σ(strengthᵢ · weightᵢ) / Σ strengthᵢ
//! ```
//!
//! rounded to two decimals.  With no fired rule the score is 0.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::rules::{RULE_TABLE, RuleId};

/// Lower bound (inclusive) of each bucket.
pub const EXCELLENT_MIN: f32 = 85.0;
pub const GOOD_MIN: f32 = 65.0;
pub const FAIR_MIN: f32 = 45.0;
pub const POOR_MIN: f32 = 25.0;

/// Score-axis quality bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityBucket {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl QualityBucket {
    pub fn from_score(score: f32) -> Self {
        if score >= EXCELLENT_MIN {
            Self::Excellent
        } else if score >= GOOD_MIN {
            Self::Good
        } else if score >= FAIR_MIN {
            Self::Fair
        } else if score >= POOR_MIN {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for QualityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weighted-average score over per-rule strengths (indexed like
/// [`RULE_TABLE`]).
pub fn weighted_score(strengths: &[f32; RuleId::COUNT]) -> f32 {
    let (num, den) = strengths
        .iter()
        .zip(RULE_TABLE.iter())
        .filter(|(s, _)| **s > 0.0)
        .fold((0.0_f32, 0.0_f32), |(num, den), (s, r)| {
            (num + s * r.score_weight, den + s)
        });
    if den <= 0.0 {
        return 0.0;
    }
    round2((num / den).clamp(0.0, 100.0))
}

fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}

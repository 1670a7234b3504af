//! Output types of one evaluation.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::rules::RuleId;
use super::score::QualityBucket;

/// Recommendation text of the sentinel decision.
pub const NO_RULE_SATISFIED: &str = "no rule satisfied";

/// Rule-level water-quality category.
///
/// Independent of [`QualityBucket`], which is derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    VeryGood,
    Good,
    Fair,
    Poor,
    /// No rule fired.
    Unknown,
}

impl Category {
    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryGood => "VeryGood",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aerator recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActuatorCommand {
    On,
    #[default]
    Off,
}

impl ActuatorCommand {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::On => "ON",
            Self::Off => "OFF",
        })
    }
}

/// Result of evaluating one reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub category: Category,
    pub actuator_command: ActuatorCommand,
    pub recommendation: String,
    pub diagnostic_trace: String,
    /// Winning rule, `None` for the sentinel.
    pub rule: Option<RuleId>,
    pub rule_strength: f32,
    /// Weighted quality score in `[0, 100]`.
    pub score: f32,
}

impl Decision {
    /// The sentinel returned when no rule has positive strength.
    pub fn no_rule_satisfied(diagnostic_trace: String) -> Self {
        Self {
            category: Category::Unknown,
            actuator_command: ActuatorCommand::Off,
            recommendation: NO_RULE_SATISFIED.into(),
            diagnostic_trace,
            rule: None,
            rule_strength: 0.0,
            score: 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.rule.is_none()
    }

    pub fn bucket(&self) -> QualityBucket {
        QualityBucket::from_score(self.score)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Some(id) => write!(
                f,
                "{} via {} ({:.2}), aerator {}, score {:.2}",
                self.category, id, self.rule_strength, self.actuator_command, self.score
            ),
            None => write!(f, "{} ({}), aerator {}", self.category, self.recommendation, self.actuator_command),
        }
    }
}

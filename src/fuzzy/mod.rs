//! Fuzzy inference engine.
//!
//! Leaf to root: [`membership`] shapes, [`fuzzify`] parameter sets,
//! [`rules`] table, [`engine`] evaluation, [`score`] bucketing.

pub mod decision;
pub mod engine;
pub mod fuzzify;
pub mod membership;
pub mod rules;
pub mod score;

pub use decision::{ActuatorCommand, Category, Decision, NO_RULE_SATISFIED};
pub use engine::{Inference, evaluate, evaluate_reading};
pub use fuzzify::{Parameter, Profiles, fuzzify};
pub use rules::{RULE_TABLE, Rule, RuleId};
pub use score::QualityBucket;

//! Rule evaluation and decision synthesis.
//!
//! The engine is a pure function of its three inputs.  It never rejects a
//! number: readings outside every fuzzy set simply fire no rule and yield
//! the `Unknown` sentinel.  Plausibility checks belong to
//! [`crate::sensors::validate`], which runs before evaluation.

use core::fmt;

use log::debug;

use super::decision::Decision;
use super::fuzzify::{Profiles, fuzzify};
use super::rules::{RULE_TABLE, Rule, RuleId};
use super::score::weighted_score;
use crate::sensors::Reading;

/// Intermediate state of one evaluation: the fuzzified inputs and the
/// strength of every rule, indexed like [`RULE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inference {
    pub ph: f32,
    pub tds: f32,
    pub turbidity: f32,
    pub profiles: Profiles,
    pub strengths: [f32; RuleId::COUNT],
}

impl Inference {
    pub fn run(ph: f32, tds: f32, turbidity: f32) -> Self {
        let profiles = fuzzify(ph, tds, turbidity);
        let strengths = core::array::from_fn(|i| RULE_TABLE[i].strength(&profiles));
        Self {
            ph,
            tds,
            turbidity,
            profiles,
            strengths,
        }
    }

    /// Rules with strength > 0, in table order.
    pub fn fired(&self) -> impl Iterator<Item = (&'static Rule, f32)> + '_ {
        RULE_TABLE
            .iter()
            .zip(self.strengths)
            .filter(|(_, s)| *s > 0.0)
    }

    pub fn fired_count(&self) -> usize {
        self.fired().count()
    }

    /// Strongest fired rule; the earliest one wins a tie.
    pub fn dominant(&self) -> Option<(&'static Rule, f32)> {
        self.fired().fold(None, |best, (rule, s)| match best {
            Some((_, best_s)) if best_s >= s => best,
            _ => Some((rule, s)),
        })
    }

    /// One-line explanation with every input, every degree, the number of
    /// fired rules and the dominant rule.
    pub fn trace(&self) -> String {
        self.to_string()
    }

    pub fn decision(&self) -> Decision {
        let trace = self.trace();
        debug!("fuzzy: {}", trace);
        match self.dominant() {
            None => Decision::no_rule_satisfied(trace),
            Some((rule, strength)) => Decision {
                category: rule.category,
                actuator_command: rule.actuator,
                recommendation: rule.text.into(),
                diagnostic_trace: trace,
                rule: Some(rule.id),
                rule_strength: strength,
                score: weighted_score(&self.strengths),
            },
        }
    }
}

impl fmt::Display for Inference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.profiles;
        write!(
            f,
            "pH: {:.2} ({}) | TDS: {:.2} ppm ({}) | Turbidity: {:.2} NTU ({}) | active rules: {}",
            self.ph,
            p.ph,
            self.tds,
            p.tds,
            self.turbidity,
            p.turbidity,
            self.fired_count()
        )?;
        match self.dominant() {
            Some((rule, s)) => write!(f, " | dominant rule: {} (strength: {:.2})", rule.id, s),
            None => write!(f, " | dominant rule: none (strength: 0.00)"),
        }
    }
}

/// Evaluate three crisp readings.
pub fn evaluate(ph: f32, tds: f32, turbidity: f32) -> Decision {
    Inference::run(ph, tds, turbidity).decision()
}

/// Evaluate the quality parameters of a [`Reading`].  Water level is not an
/// input to the rule base.
pub fn evaluate_reading(reading: &Reading) -> Decision {
    evaluate(reading.ph, reading.tds, reading.turbidity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::decision::{ActuatorCommand, Category, NO_RULE_SATISFIED};
    use crate::fuzzy::score::QualityBucket;

    #[test]
    fn ideal_water_is_good_and_aerator_off() {
        let d = evaluate(7.5, 380.0, 10.0);
        assert!(matches!(d.category, Category::Good | Category::VeryGood));
        assert_eq!(d.actuator_command, ActuatorCommand::Off);
        // R3 fires at 0.5, R7 at 1.0
        assert_eq!(d.rule, Some(RuleId::R7));
        assert_eq!(d.rule_strength, 1.0);
        assert_eq!(d.score, 75.0);
        assert_eq!(d.bucket(), QualityBucket::Good);
    }

    #[test]
    fn bad_water_is_poor_and_aerator_on() {
        let d = evaluate(9.0, 900.0, 80.0);
        assert_eq!(d.category, Category::Poor);
        assert_eq!(d.actuator_command, ActuatorCommand::On);
        // R5, R6 and R8 all fire at 1.0; R5 is listed first.
        assert_eq!(d.rule, Some(RuleId::R5));
        assert_eq!(d.score, 30.0);
        assert_eq!(d.bucket(), QualityBucket::Poor);
    }

    #[test]
    fn nothing_fires_outside_every_set() {
        let d = evaluate(100.0, 5000.0, 500.0);
        assert_eq!(d.category, Category::Unknown);
        assert_eq!(d.actuator_command, ActuatorCommand::Off);
        assert_eq!(d.recommendation, NO_RULE_SATISFIED);
        assert_eq!(d.rule, None);
        assert_eq!(d.rule_strength, 0.0);
        assert_eq!(d.score, 0.0);
        assert!(d.is_unknown());
    }

    #[test]
    fn ties_go_to_the_earliest_rule() {
        let inf = Inference::run(9.0, 900.0, 80.0);
        let fired: Vec<_> = inf.fired().map(|(r, _)| r.id).collect();
        assert_eq!(fired, vec![RuleId::R5, RuleId::R6, RuleId::R8]);
        assert_eq!(inf.dominant().map(|(r, _)| r.id), Some(RuleId::R5));
    }

    #[test]
    fn evaluation_is_idempotent() {
        assert_eq!(evaluate(6.8, 410.0, 14.0), evaluate(6.8, 410.0, 14.0));
    }

    #[test]
    fn trace_lists_inputs_degrees_and_winner() {
        let d = evaluate(7.5, 380.0, 10.0);
        assert_eq!(
            d.diagnostic_trace,
            "pH: 7.50 (low: 0.00, normal: 1.00, high: 0.00) | \
             TDS: 380.00 ppm (low: 0.00, normal: 1.00, high: 0.00) | \
             Turbidity: 10.00 NTU (low: 0.50, medium: 0.00, high: 0.00) | \
             active rules: 2 | dominant rule: R7 (strength: 1.00)"
        );
    }

    #[test]
    fn sentinel_trace_names_no_rule() {
        let d = evaluate(100.0, 5000.0, 500.0);
        assert!(d.diagnostic_trace.ends_with("active rules: 0 | dominant rule: none (strength: 0.00)"));
    }

    #[test]
    fn non_finite_inputs_do_not_panic() {
        let d = evaluate(f32::NAN, f32::INFINITY, f32::NEG_INFINITY);
        assert!(d.is_unknown());
    }

    #[test]
    fn evaluate_reading_ignores_water_level() {
        let r = Reading {
            ph: 7.5,
            tds: 380.0,
            turbidity: 10.0,
            water_level: 42.0,
            timestamp: 1_700_000_000,
        };
        assert_eq!(evaluate_reading(&r), evaluate(7.5, 380.0, 10.0));
    }
}

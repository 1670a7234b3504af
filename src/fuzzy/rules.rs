//! Static rule table.
//!
//! Each rule is a plain data row: an antecedent made of `(parameter, label)`
//! terms that are AND-ed with `min`, and a fixed consequent.  No closures
//! and no dynamic dispatch, so the evaluator is table-driven and every rule
//! can be tested on its own.
//!
//! ```text
//!  id  │ antecedent                               │ category │ aerator
//! ─────┼──────────────────────────────────────────┼──────────┼────────
//!  R1  │ ph.low    ∧ tds.high   ∧ turbidity.high  │ Poor     │ ON
//!  R2  │ ph.low    ∧ tds.normal ∧ turbidity.medium│ Fair     │ ON
//!  R3  │ ph.normal ∧ tds.normal ∧ turbidity.low   │ Good     │ OFF
//!  R4  │ ph.normal ∧ tds.low    ∧ turbidity.low   │ VeryGood │ OFF
//!  R5  │ ph.high                                  │ Poor     │ ON
//!  R6  │ turbidity.high                           │ Poor     │ ON
//!  R7  │ ph.normal ∧ tds.normal                   │ Good     │ OFF
//!  R8  │ tds.high  ∧ turbidity.high               │ Poor     │ ON
//!  R9  │ ph.low    ∧ turbidity.high               │ Poor     │ ON
//!  R10 │ tds.low   ∧ turbidity.low                │ Good     │ OFF
//! ```
//!
//! Table order is the tie-break order: when two rules fire with the same
//! strength, the one listed first wins.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::decision::{ActuatorCommand, Category};
use super::fuzzify::{Label, Parameter, PhLabel, Profiles, TdsLabel, TurbidityLabel};

// ───────────────────────────────────────────────────────────────
// Rule identity
// ───────────────────────────────────────────────────────────────

/// Identity of a rule.  Must stay in sync with [`RULE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RuleId {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
    R9 = 8,
    R10 = 9,
}

impl RuleId {
    /// Number of rules in the table.
    pub const COUNT: usize = 10;

    /// One-based rule number as used in traces.
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.number())
    }
}

// ───────────────────────────────────────────────────────────────
// Antecedent terms
// ───────────────────────────────────────────────────────────────

/// One `parameter is label` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Ph(PhLabel),
    Tds(TdsLabel),
    Turbidity(TurbidityLabel),
}

impl Term {
    /// Membership degree of this clause in the given profiles.
    pub fn degree(self, profiles: &Profiles) -> f32 {
        match self {
            Self::Ph(l) => profiles.ph.degree(l),
            Self::Tds(l) => profiles.tds.degree(l),
            Self::Turbidity(l) => profiles.turbidity.degree(l),
        }
    }

    pub fn parameter(self) -> Parameter {
        match self {
            Self::Ph(_) => Parameter::Ph,
            Self::Tds(_) => Parameter::Tds,
            Self::Turbidity(_) => Parameter::Turbidity,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ph(l) => l.name(),
            Self::Tds(l) => l.name(),
            Self::Turbidity(l) => l.name(),
        };
        write!(f, "{}.{}", self.parameter().key(), label)
    }
}

// ───────────────────────────────────────────────────────────────
// Rule descriptor (one row in the table)
// ───────────────────────────────────────────────────────────────

/// Static descriptor for a single rule.
#[derive(Debug)]
pub struct Rule {
    pub id: RuleId,
    /// Clauses AND-ed together with `min`.  Never empty.
    pub antecedent: &'static [Term],
    pub category: Category,
    pub actuator: ActuatorCommand,
    /// Fixed recommendation text.
    pub text: &'static str,
    /// Singleton output on the 0–100 score axis.
    pub score_weight: f32,
}

impl Rule {
    /// Firing strength: the minimum degree over the antecedent.
    pub fn strength(&self, profiles: &Profiles) -> f32 {
        self.antecedent
            .iter()
            .map(|t| t.degree(profiles))
            .fold(1.0, f32::min)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: IF ", self.id)?;
        for (i, term) in self.antecedent.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{term}")?;
        }
        write!(f, " THEN {} / aerator {}", self.category, self.actuator)
    }
}

use Term::{Ph, Tds, Turbidity};

/// The rule base, in evaluation (and tie-break) order.
pub static RULE_TABLE: [Rule; RuleId::COUNT] = [
    Rule {
        id: RuleId::R1,
        antecedent: &[Ph(PhLabel::Low), Tds(TdsLabel::High), Turbidity(TurbidityLabel::High)],
        category: Category::Poor,
        actuator: ActuatorCommand::On,
        text: "Acidic water with high dissolved solids and heavy turbidity: run the aerator, \
               exchange water and correct pH immediately",
        score_weight: 15.0,
    },
    Rule {
        id: RuleId::R2,
        antecedent: &[Ph(PhLabel::Low), Tds(TdsLabel::Normal), Turbidity(TurbidityLabel::Medium)],
        category: Category::Fair,
        actuator: ActuatorCommand::On,
        text: "Slightly acidic water with moderate turbidity: run the aerator and apply lime to raise pH",
        score_weight: 55.0,
    },
    Rule {
        id: RuleId::R3,
        antecedent: &[Ph(PhLabel::Normal), Tds(TdsLabel::Normal), Turbidity(TurbidityLabel::Low)],
        category: Category::Good,
        actuator: ActuatorCommand::Off,
        text: "pH and dissolved solids are normal and the water is clear: keep routine monitoring",
        score_weight: 75.0,
    },
    Rule {
        id: RuleId::R4,
        antecedent: &[Ph(PhLabel::Normal), Tds(TdsLabel::Low), Turbidity(TurbidityLabel::Low)],
        category: Category::VeryGood,
        actuator: ActuatorCommand::Off,
        text: "Normal pH, low dissolved solids and clear water: conditions are very good, \
               keep the current management",
        score_weight: 95.0,
    },
    Rule {
        id: RuleId::R5,
        antecedent: &[Ph(PhLabel::High)],
        category: Category::Poor,
        actuator: ActuatorCommand::On,
        text: "Alkaline water raises ammonia toxicity: run the aerator and lower pH",
        score_weight: 30.0,
    },
    Rule {
        id: RuleId::R6,
        antecedent: &[Turbidity(TurbidityLabel::High)],
        category: Category::Poor,
        actuator: ActuatorCommand::On,
        text: "Water is highly turbid: run the aerator and reduce suspended solids",
        score_weight: 30.0,
    },
    Rule {
        id: RuleId::R7,
        antecedent: &[Ph(PhLabel::Normal), Tds(TdsLabel::Normal)],
        category: Category::Good,
        actuator: ActuatorCommand::Off,
        text: "pH and dissolved solids are within the normal range: conditions are good",
        score_weight: 75.0,
    },
    Rule {
        id: RuleId::R8,
        antecedent: &[Tds(TdsLabel::High), Turbidity(TurbidityLabel::High)],
        category: Category::Poor,
        actuator: ActuatorCommand::On,
        text: "High dissolved solids with heavy turbidity: run the aerator and exchange part of the water",
        score_weight: 30.0,
    },
    Rule {
        id: RuleId::R9,
        antecedent: &[Ph(PhLabel::Low), Turbidity(TurbidityLabel::High)],
        category: Category::Poor,
        actuator: ActuatorCommand::On,
        text: "Acidic and turbid water: run the aerator and apply lime",
        score_weight: 30.0,
    },
    Rule {
        id: RuleId::R10,
        antecedent: &[Tds(TdsLabel::Low), Turbidity(TurbidityLabel::Low)],
        category: Category::Good,
        actuator: ActuatorCommand::Off,
        text: "Low dissolved solids with clear water: conditions are good, consider mineral supplements",
        score_weight: 75.0,
    },
];

/// Look up a rule by identity.
pub fn rule(id: RuleId) -> &'static Rule {
    &RULE_TABLE[id as usize]
}

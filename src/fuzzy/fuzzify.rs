//! Fixed fuzzy-set definitions for pH, TDS and turbidity.
//!
//! Each fuzzifier turns one crisp reading into a [`MembershipProfile`]
//! over a closed set of linguistic labels.  The breakpoints below are
//! calibrated for shrimp ponds and must not drift: stored decisions and
//! their traces are compared against them.
//!
//! | parameter | label  | shape                          |
//! |-----------|--------|--------------------------------|
//! | pH        | low    | trapezoid(0, 0, 6.5, 7.0)      |
//! | pH        | normal | triangle(6.5, 7.5, 8.5)        |
//! | pH        | high   | trapezoid(8.0, 8.5, 14, 14)    |
//! | TDS       | low    | trapezoid(0, 0, 300, 350)      |
//! | TDS       | normal | triangle(320, 380, 450)        |
//! | TDS       | high   | trapezoid(420, 500, 1000, 1000)|
//! | turbidity | low    | trapezoid(0, 0, 8, 12)         |
//! | turbidity | medium | triangle(10, 15, 20)           |
//! | turbidity | high   | trapezoid(18, 25, 100, 100)    |

use core::fmt;
use core::marker::PhantomData;

use serde::{Deserialize, Serialize};

use super::membership::{trapezoid, triangle};

// ───────────────────────────────────────────────────────────────
// Parameters and labels
// ───────────────────────────────────────────────────────────────

/// The three water-quality inputs the engine reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    Ph,
    Tds,
    Turbidity,
}

impl Parameter {
    /// All parameters, in canonical (alphabetical) order.
    pub const ALL: [Self; 3] = [Self::Ph, Self::Tds, Self::Turbidity];

    /// Stable lowercase identifier, used in rate-limit keys.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Ph => "ph",
            Self::Tds => "tds",
            Self::Turbidity => "turbidity",
        }
    }

    /// Human-facing name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Ph => "pH",
            Self::Tds => "TDS",
            Self::Turbidity => "Turbidity",
        }
    }

    /// Measurement unit suffix (empty for pH).
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Ph => "",
            Self::Tds => "ppm",
            Self::Turbidity => "NTU",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A closed set of three linguistic labels for one parameter.
pub trait Label: Copy + fmt::Debug + 'static {
    /// Labels in profile order.
    const ALL: [Self; 3];

    /// Position of the label inside a profile.
    fn index(self) -> usize;

    /// Lowercase label name as shown in traces.
    fn name(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhLabel {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TdsLabel {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurbidityLabel {
    Low,
    Medium,
    High,
}

impl Label for PhLabel {
    const ALL: [Self; 3] = [Self::Low, Self::Normal, Self::High];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl Label for TdsLabel {
    const ALL: [Self; 3] = [Self::Low, Self::Normal, Self::High];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl Label for TurbidityLabel {
    const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Membership profile
// ───────────────────────────────────────────────────────────────

/// Label → degree mapping for one parameter.
///
/// Degrees are independent: they may overlap or all be zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembershipProfile<L: Label> {
    degrees: [f32; 3],
    _label: PhantomData<L>,
}

impl<L: Label> MembershipProfile<L> {
    /// Build a profile from degrees given in `L::ALL` order.
    pub fn from_degrees(degrees: [f32; 3]) -> Self {
        Self {
            degrees,
            _label: PhantomData,
        }
    }

    pub fn degree(&self, label: L) -> f32 {
        self.degrees[label.index()]
    }

    /// `(label, degree)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (L, f32)> + '_ {
        L::ALL.into_iter().map(move |l| (l, self.degree(l)))
    }

    /// True when every label has zero membership.
    pub fn is_empty(&self) -> bool {
        self.degrees.iter().all(|d| *d <= 0.0)
    }
}

impl<L: Label> fmt::Display for MembershipProfile<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (label, degree)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:.2}", label.name(), degree)?;
        }
        Ok(())
    }
}

/// The three profiles computed for one reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profiles {
    pub ph: MembershipProfile<PhLabel>,
    pub tds: MembershipProfile<TdsLabel>,
    pub turbidity: MembershipProfile<TurbidityLabel>,
}

impl Profiles {
    /// True when no label of any parameter has membership.
    pub fn is_empty(&self) -> bool {
        self.ph.is_empty() && self.tds.is_empty() && self.turbidity.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Fuzzifiers
// ───────────────────────────────────────────────────────────────

pub fn fuzzify_ph(ph: f32) -> MembershipProfile<PhLabel> {
    MembershipProfile::from_degrees([
        trapezoid(ph, 0.0, 0.0, 6.5, 7.0),
        triangle(ph, 6.5, 7.5, 8.5),
        trapezoid(ph, 8.0, 8.5, 14.0, 14.0),
    ])
}

pub fn fuzzify_tds(tds: f32) -> MembershipProfile<TdsLabel> {
    MembershipProfile::from_degrees([
        trapezoid(tds, 0.0, 0.0, 300.0, 350.0),
        triangle(tds, 320.0, 380.0, 450.0),
        trapezoid(tds, 420.0, 500.0, 1000.0, 1000.0),
    ])
}

pub fn fuzzify_turbidity(turbidity: f32) -> MembershipProfile<TurbidityLabel> {
    MembershipProfile::from_degrees([
        trapezoid(turbidity, 0.0, 0.0, 8.0, 12.0),
        triangle(turbidity, 10.0, 15.0, 20.0),
        trapezoid(turbidity, 18.0, 25.0, 100.0, 100.0),
    ])
}

/// Fuzzify all three inputs at once.
pub fn fuzzify(ph: f32, tds: f32, turbidity: f32) -> Profiles {
    Profiles {
        ph: fuzzify_ph(ph),
        tds: fuzzify_tds(tds),
        turbidity: fuzzify_turbidity(turbidity),
    }
}

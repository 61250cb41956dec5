//! One-rep max estimation.
//!
//! Nine published estimation formulas are kept side by side. A single set
//! rarely says much on its own, so the recommended estimate picks the
//! formula best suited to the rep range (or the lift class when the caller
//! knows it) and falls back to the nine-formula mean for high-rep sets.

use crate::catalog::LiftClass;
use crate::{Error, Result};

/// The closed set of supported 1RM estimation formulas.
///
/// Every formula is monotonic in both weight and reps over its defined
/// range. Formulas whose denominator collapses at extreme rep counts
/// (Brzycki at 37+, Lander at 38+) return the input weight instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Formula {
    Epley,
    Brzycki,
    Lander,
    Lombardi,
    Mayhew,
    OConner,
    Wathan,
    Berger,
    Brown,
}

impl Formula {
    pub const ALL: [Formula; 9] = [
        Formula::Epley,
        Formula::Brzycki,
        Formula::Lander,
        Formula::Lombardi,
        Formula::Mayhew,
        Formula::OConner,
        Formula::Wathan,
        Formula::Berger,
        Formula::Brown,
    ];

    /// Raw (unrounded) estimate for one formula.
    ///
    /// A single rep is already a max effort, so every formula returns the
    /// input weight exactly at reps=1.
    pub fn estimate(self, weight: f64, reps: u32) -> f64 {
        if weight <= 0.0 {
            return 0.0;
        }
        if reps <= 1 {
            return weight;
        }
        let r = f64::from(reps);

        match self {
            Formula::Epley => weight * (1.0 + r / 30.0),
            Formula::Brzycki => {
                let denom = 37.0 - r;
                if denom <= 0.0 {
                    weight
                } else {
                    weight * 36.0 / denom
                }
            }
            Formula::Lander => {
                let denom = 101.3 - 2.67123 * r;
                if denom <= 0.0 {
                    weight
                } else {
                    100.0 * weight / denom
                }
            }
            Formula::Lombardi => weight * r.powf(0.10),
            Formula::Mayhew => 100.0 * weight / (52.2 + 41.9 * (-0.055 * r).exp()),
            Formula::OConner => weight * (1.0 + 0.025 * r),
            Formula::Wathan => 100.0 * weight / (48.8 + 53.8 * (-0.075 * r).exp()),
            Formula::Berger => weight / (1.0261 * (-0.0262 * r).exp()),
            Formula::Brown => weight * (0.9849 + 0.0328 * r),
        }
    }
}

/// Mean of all nine formulas (unrounded)
pub fn formula_mean(weight: f64, reps: u32) -> f64 {
    let sum: f64 = Formula::ALL
        .iter()
        .map(|f| f.estimate(weight, reps))
        .sum();
    sum / Formula::ALL.len() as f64
}

/// Pick the formula used for the recommended estimate.
///
/// Rep-range dispatch: Brzycki tracks near-failure singles and triples,
/// O'Conner the 4-6 strength range, Brown the 7-10 hypertrophy range.
/// Above that no single formula stays honest and the mean is used.
/// A lift-class hint overrides the rep dispatch: heavy compound lower-body
/// pulls grade best under Brzycki, isolation lifts under Brown.
fn select_formula(reps: u32, class: Option<LiftClass>) -> Option<Formula> {
    match class {
        Some(LiftClass::CompoundLower) => return Some(Formula::Brzycki),
        Some(LiftClass::Isolation) => return Some(Formula::Brown),
        _ => {}
    }
    match reps {
        1..=3 => Some(Formula::Brzycki),
        4..=6 => Some(Formula::OConner),
        7..=10 => Some(Formula::Brown),
        _ => None, // nine-formula mean
    }
}

/// Estimate the single-rep max for a completed set.
///
/// Deterministic; rounds to one decimal place only at this boundary.
pub fn estimate_max(weight: f64, reps: u32, class: Option<LiftClass>) -> Result<f64> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(Error::Validation(format!(
            "weight must be a non-negative number, got {weight}"
        )));
    }
    if reps == 0 {
        return Err(Error::Validation("reps must be at least 1".into()));
    }

    let raw = match select_formula(reps, class) {
        Some(formula) => formula.estimate(weight, reps),
        None => formula_mean(weight, reps),
    };

    Ok(round1(raw))
}

/// All nine estimates plus their mean, for display and cross-validation
pub fn estimate_all(weight: f64, reps: u32) -> Vec<(Formula, f64)> {
    Formula::ALL
        .iter()
        .map(|&f| (f, round1(f.estimate(weight, reps))))
        .collect()
}

// ============================================================================
// Rep / %1RM lookup
// ============================================================================

/// %1RM lifted at each rep count, 1-20
const RM_PERCENTAGES: [f64; 20] = [
    100.0, 95.0, 90.0, 88.0, 86.0, 83.0, 80.0, 78.0, 76.0, 75.0, 72.0, 70.0, 68.0, 66.0,
    65.0, 63.0, 61.0, 60.0, 58.0, 57.0,
];

const MIN_RM_PERCENTAGE: f64 = 50.0;

/// Percentage of 1RM a set of `reps` represents.
///
/// Beyond 20 reps the table is extrapolated linearly at -0.5 points per
/// rep and floored at 50%.
pub fn rm_percentage(reps: u32) -> f64 {
    match reps {
        0 => 100.0,
        1..=20 => RM_PERCENTAGES[(reps - 1) as usize],
        _ => {
            let extrapolated = 57.0 - 0.5 * f64::from(reps - 20);
            extrapolated.max(MIN_RM_PERCENTAGE)
        }
    }
}

/// Derive 1RM from the percentage table: weight / pct * 100.
///
/// Cross-validation companion to `estimate_max`; the two are not expected
/// to agree exactly.
pub fn max_from_percentage(weight: f64, reps: u32) -> f64 {
    round1(weight / rm_percentage(reps) * 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

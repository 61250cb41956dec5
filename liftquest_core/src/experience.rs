//! Experience point calculation.
//!
//! Converts a graded workout into experience points: volume-based base,
//! additive bonuses for grade, set volume and personal records, then a
//! level penalty that damps gains at high body-part levels. Every
//! component is rounded independently so breakdowns always sum.

use crate::types::Grade;
use crate::{Error, Result};

/// Itemized experience calculation.
///
/// `total = max(1, base + grade_bonus + volume_bonus + pr_bonus + level_penalty)`
/// where `level_penalty <= 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpBreakdown {
    pub base: i64,
    pub grade_bonus: i64,
    pub volume_bonus: i64,
    pub pr_bonus: i64,
    /// Zero or negative
    pub level_penalty: i64,
    pub total: i64,
}

/// Inputs for one experience calculation
#[derive(Clone, Copy, Debug)]
pub struct ExpInput {
    pub sets: u32,
    pub reps: u32,
    pub weight_kg: f64,
    /// Exercise difficulty on a 1-10 scale
    pub difficulty: u8,
    pub grade: Grade,
    pub personal_record: bool,
    /// Current level of the trained body part
    pub level: u32,
}

/// Base experience: volume scaled by difficulty.
///
/// `round(sets * reps * weight * difficulty / 10)`
fn base_exp(sets: u32, reps: u32, weight_kg: f64, difficulty: u8) -> i64 {
    let volume = f64::from(sets) * f64::from(reps) * weight_kg;
    (volume * f64::from(difficulty) / 10.0).round() as i64
}

/// Extra experience for high-set sessions
fn volume_bonus(sets: u32, base: i64) -> i64 {
    let rate = if sets >= 10 {
        0.15
    } else if sets >= 7 {
        0.10
    } else if sets >= 5 {
        0.05
    } else {
        0.0
    };
    (base as f64 * rate).round() as i64
}

/// Penalty rate by body-part level, in 5-level bands capped at 60%
fn level_penalty_rate(level: u32) -> f64 {
    match level {
        0..=5 => 0.0,
        6..=10 => 0.1,
        11..=15 => 0.2,
        16..=20 => 0.3,
        21..=25 => 0.4,
        26..=30 => 0.5,
        _ => 0.6,
    }
}

/// Compute the experience awarded for one workout entry.
///
/// Always returns at least 1 total point for a valid workout, no matter
/// how deep the level penalty cuts.
pub fn calculate_exp(input: &ExpInput) -> Result<ExpBreakdown> {
    if input.sets == 0 || input.reps == 0 {
        return Err(Error::Validation(
            "sets and reps must be at least 1".into(),
        ));
    }
    if !input.weight_kg.is_finite() || input.weight_kg < 0.0 {
        return Err(Error::Validation(format!(
            "weight must be a non-negative number, got {}",
            input.weight_kg
        )));
    }
    if input.level == 0 {
        return Err(Error::Validation("level must be at least 1".into()));
    }

    let base = base_exp(input.sets, input.reps, input.weight_kg, input.difficulty);
    let grade_bonus = (base as f64 * input.grade.bonus_rate()).round() as i64;
    let volume_bonus = volume_bonus(input.sets, base);
    let pr_bonus = if input.personal_record {
        (base as f64 * 0.5).round() as i64
    } else {
        0
    };

    let subtotal = base + grade_bonus + volume_bonus + pr_bonus;
    let level_penalty =
        -((subtotal as f64 * level_penalty_rate(input.level)).round() as i64);
    let total = (subtotal + level_penalty).max(1);

    Ok(ExpBreakdown {
        base,
        grade_bonus,
        volume_bonus,
        pr_bonus,
        level_penalty,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(sets: u32, reps: u32, weight: f64) -> ExpInput {
        ExpInput {
            sets,
            reps,
            weight_kg: weight,
            difficulty: 5,
            grade: Grade::Bronze,
            personal_record: false,
            level: 1,
        }
    }

    #[test]
    fn test_base_exp_formula() {
        // 3 sets x 10 reps x 60kg x 0.5 difficulty = 900
        let breakdown = calculate_exp(&input(3, 10, 60.0)).unwrap();
        assert_eq!(breakdown.base, 900);
        assert_eq!(breakdown.total, 900);
    }

    #[test]
    fn test_grade_bonus_scales_with_grade() {
        let mut i = input(3, 10, 60.0);

        i.grade = Grade::Gold;
        assert_eq!(calculate_exp(&i).unwrap().grade_bonus, 225);

        i.grade = Grade::Challenger;
        assert_eq!(calculate_exp(&i).unwrap().grade_bonus, 1350);
    }

    #[test]
    fn test_volume_bonus_tiers() {
        assert_eq!(calculate_exp(&input(3, 10, 60.0)).unwrap().volume_bonus, 0);

        // base = 5*10*60*0.5 = 1500, 5% = 75
        assert_eq!(calculate_exp(&input(5, 10, 60.0)).unwrap().volume_bonus, 75);
        // base = 2100, 10% = 210
        assert_eq!(calculate_exp(&input(7, 10, 60.0)).unwrap().volume_bonus, 210);
        // base = 3000, 15% = 450
        assert_eq!(calculate_exp(&input(10, 10, 60.0)).unwrap().volume_bonus, 450);
    }

    #[test]
    fn test_pr_bonus_is_half_of_base() {
        let mut i = input(3, 10, 60.0);
        i.personal_record = true;
        let breakdown = calculate_exp(&i).unwrap();
        assert_eq!(breakdown.pr_bonus, 450);
        assert_eq!(breakdown.total, 1350);
    }

    #[test]
    fn test_level_penalty_bands() {
        let mut i = input(3, 10, 60.0); // subtotal 900

        i.level = 5;
        assert_eq!(calculate_exp(&i).unwrap().level_penalty, 0);

        i.level = 6;
        let b = calculate_exp(&i).unwrap();
        assert_eq!(b.level_penalty, -90);
        assert_eq!(b.total, 810);

        i.level = 15;
        assert_eq!(calculate_exp(&i).unwrap().level_penalty, -180);

        i.level = 31;
        let b = calculate_exp(&i).unwrap();
        assert_eq!(b.level_penalty, -540);
        assert_eq!(b.total, 360);

        // Rate caps at 60%
        i.level = 99;
        assert_eq!(calculate_exp(&i).unwrap().level_penalty, -540);
    }

    #[test]
    fn test_penalty_applies_to_subtotal_not_base() {
        let mut i = input(3, 10, 60.0);
        i.grade = Grade::Gold; // subtotal 900 + 225 = 1125
        i.level = 6;
        let b = calculate_exp(&i).unwrap();
        assert_eq!(b.level_penalty, -113); // round(1125 * 0.1)
        assert_eq!(b.total, 1012);
    }

    #[test]
    fn test_total_never_below_one() {
        let mut i = input(1, 1, 0.1);
        i.level = 40;
        let b = calculate_exp(&i).unwrap();
        assert_eq!(b.total, 1);
    }

    #[test]
    fn test_breakdown_components_sum_to_total() {
        let mut i = input(7, 8, 82.5);
        i.grade = Grade::Platinum;
        i.personal_record = true;
        i.level = 12;
        let b = calculate_exp(&i).unwrap();
        assert_eq!(
            b.total,
            (b.base + b.grade_bonus + b.volume_bonus + b.pr_bonus + b.level_penalty).max(1)
        );
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(calculate_exp(&input(0, 10, 60.0)).is_err());
        assert!(calculate_exp(&input(3, 0, 60.0)).is_err());
        assert!(calculate_exp(&input(3, 10, -60.0)).is_err());

        let mut i = input(3, 10, 60.0);
        i.level = 0;
        assert!(calculate_exp(&i).is_err());
    }
}

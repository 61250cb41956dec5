//! Built-in exercise catalog.
//!
//! Maps exercise identifiers to the attributes the scoring engine needs:
//! target body part, difficulty, metabolic index (METs) and the movement
//! classification used by the estimator.

use crate::types::BodyPart;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Broad movement classification used for 1RM formula selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiftClass {
    CompoundLower,
    CompoundUpper,
    Isolation,
    Bodyweight,
}

/// An exercise definition
#[derive(Clone, Debug)]
pub struct Exercise {
    pub id: &'static str,
    pub name: &'static str,
    pub body_part: BodyPart,
    pub class: LiftClass,
    /// Difficulty on a 1-10 scale, feeds base experience
    pub difficulty: u8,
    /// Metabolic equivalent of task, feeds calorie estimation
    pub mets: f64,
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<HashMap<&'static str, Exercise>> = Lazy::new(build_catalog);

fn build_catalog() -> HashMap<&'static str, Exercise> {
    let entries = [
        // Compound lower
        Exercise {
            id: "squat",
            name: "Squat",
            body_part: BodyPart::Leg,
            class: LiftClass::CompoundLower,
            difficulty: 7,
            mets: 5.0,
        },
        Exercise {
            id: "deadlift",
            name: "Deadlift",
            body_part: BodyPart::Back,
            class: LiftClass::CompoundLower,
            difficulty: 8,
            mets: 6.0,
        },
        Exercise {
            id: "leg_press",
            name: "Leg Press",
            body_part: BodyPart::Leg,
            class: LiftClass::CompoundLower,
            difficulty: 5,
            mets: 5.5,
        },
        Exercise {
            id: "lunge",
            name: "Lunge",
            body_part: BodyPart::Leg,
            class: LiftClass::CompoundLower,
            difficulty: 4,
            mets: 4.5,
        },
        Exercise {
            id: "hip_thrust",
            name: "Hip Thrust",
            body_part: BodyPart::Hip,
            class: LiftClass::CompoundLower,
            difficulty: 5,
            mets: 4.5,
        },
        // Compound upper
        Exercise {
            id: "bench_press",
            name: "Bench Press",
            body_part: BodyPart::Chest,
            class: LiftClass::CompoundUpper,
            difficulty: 6,
            mets: 3.0,
        },
        Exercise {
            id: "overhead_press",
            name: "Overhead Press",
            body_part: BodyPart::Shoulder,
            class: LiftClass::CompoundUpper,
            difficulty: 6,
            mets: 3.5,
        },
        Exercise {
            id: "barbell_row",
            name: "Barbell Row",
            body_part: BodyPart::Back,
            class: LiftClass::CompoundUpper,
            difficulty: 5,
            mets: 4.0,
        },
        Exercise {
            id: "pull_up",
            name: "Pull-up",
            body_part: BodyPart::Back,
            class: LiftClass::Bodyweight,
            difficulty: 7,
            mets: 8.0,
        },
        // Isolation
        Exercise {
            id: "barbell_curl",
            name: "Barbell Curl",
            body_part: BodyPart::Arm,
            class: LiftClass::Isolation,
            difficulty: 3,
            mets: 2.5,
        },
        Exercise {
            id: "triceps_extension",
            name: "Triceps Extension",
            body_part: BodyPart::Arm,
            class: LiftClass::Isolation,
            difficulty: 3,
            mets: 2.5,
        },
        Exercise {
            id: "lateral_raise",
            name: "Lateral Raise",
            body_part: BodyPart::Shoulder,
            class: LiftClass::Isolation,
            difficulty: 2,
            mets: 2.0,
        },
        // Bodyweight
        Exercise {
            id: "push_up",
            name: "Push-up",
            body_part: BodyPart::Chest,
            class: LiftClass::Bodyweight,
            difficulty: 2,
            mets: 3.8,
        },
        Exercise {
            id: "sit_up",
            name: "Sit-up",
            body_part: BodyPart::Abdominal,
            class: LiftClass::Bodyweight,
            difficulty: 2,
            mets: 3.0,
        },
        Exercise {
            id: "hanging_leg_raise",
            name: "Hanging Leg Raise",
            body_part: BodyPart::Abdominal,
            class: LiftClass::Bodyweight,
            difficulty: 4,
            mets: 3.0,
        },
        Exercise {
            id: "plank",
            name: "Plank",
            body_part: BodyPart::Abdominal,
            class: LiftClass::Bodyweight,
            difficulty: 2,
            mets: 3.0,
        },
    ];

    entries.into_iter().map(|e| (e.id, e)).collect()
}

/// Look up an exercise by identifier (case-insensitive)
pub fn find_exercise(exercise_id: &str) -> Option<&'static Exercise> {
    let normalized = exercise_id.to_lowercase();
    DEFAULT_CATALOG.get(normalized.as_str())
}

/// METs for an exercise, with a conservative default for unknown identifiers
pub fn exercise_mets(exercise_id: &str) -> f64 {
    find_exercise(exercise_id).map(|e| e.mets).unwrap_or(3.0)
}

/// Difficulty (1-10) for an exercise, defaulting to mid-scale
pub fn exercise_difficulty(exercise_id: &str) -> u8 {
    find_exercise(exercise_id).map(|e| e.difficulty).unwrap_or(5)
}

/// Representative certification exercise for each body part
pub fn certification_exercise(body_part: BodyPart) -> &'static Exercise {
    let id = match body_part {
        BodyPart::Shoulder => "overhead_press",
        BodyPart::Chest => "bench_press",
        BodyPart::Back => "deadlift",
        BodyPart::Arm => "barbell_curl",
        BodyPart::Abdominal => "hanging_leg_raise",
        BodyPart::Hip => "hip_thrust",
        BodyPart::Leg => "squat",
    };
    DEFAULT_CATALOG
        .get(id)
        .unwrap_or_else(|| panic!("catalog missing certification exercise {id}"))
}

/// Coefficient of bodyweight used as the certification baseline weight
pub fn certification_coefficient(body_part: BodyPart) -> f64 {
    match body_part {
        BodyPart::Shoulder => 0.4,
        BodyPart::Chest => 0.6,
        BodyPart::Back => 1.0,
        BodyPart::Arm => 0.3,
        BodyPart::Abdominal => 0.0,
        BodyPart::Hip => 1.2,
        BodyPart::Leg => 1.0,
    }
}

/// Body part an exercise trains, when known
pub fn exercise_body_part(exercise_id: &str) -> Option<BodyPart> {
    find_exercise(exercise_id).map(|e| e.body_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_exercise() {
        let squat = find_exercise("squat").unwrap();
        assert_eq!(squat.body_part, BodyPart::Leg);
        assert_eq!(squat.class, LiftClass::CompoundLower);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(find_exercise("Bench_Press").is_some());
        assert!(find_exercise("DEADLIFT").is_some());
    }

    #[test]
    fn test_unknown_exercise_defaults() {
        assert!(find_exercise("underwater_basket_press").is_none());
        assert_eq!(exercise_mets("underwater_basket_press"), 3.0);
        assert_eq!(exercise_difficulty("underwater_basket_press"), 5);
    }

    #[test]
    fn test_every_body_part_has_certification_exercise() {
        for part in BodyPart::ALL {
            let exercise = certification_exercise(part);
            assert_eq!(exercise.body_part, part);
        }
    }

    #[test]
    fn test_certification_coefficients_in_range() {
        for part in BodyPart::ALL {
            let c = certification_coefficient(part);
            assert!((0.0..=1.5).contains(&c));
        }
    }
}

//! Core domain types for the Liftquest scoring engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Subjects and their physiology (bodyweight, gender, age)
//! - Body parts and performance grades
//! - Workout entries and per-body-part progression state
//! - Certification attempts and their lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Subject Types
// ============================================================================

/// Biological gender used for grade thresholds and certification conditions
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Scaling applied to certification weight requirements
    pub fn certification_factor(self) -> f64 {
        match self {
            Gender::Male => 1.0,
            Gender::Female => 0.7,
        }
    }
}

/// Physiological profile for a subject (provided by an external collaborator)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub subject_id: String,
    pub bodyweight_kg: f64,
    pub gender: Gender,
    pub age: Option<u32>,
}

// ============================================================================
// Body Parts and Grades
// ============================================================================

/// The seven trainable body parts tracked by the progression system
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Shoulder,
    Chest,
    Back,
    Arm,
    Abdominal,
    Hip,
    Leg,
}

impl BodyPart {
    pub const ALL: [BodyPart; 7] = [
        BodyPart::Shoulder,
        BodyPart::Chest,
        BodyPart::Back,
        BodyPart::Arm,
        BodyPart::Abdominal,
        BodyPart::Hip,
        BodyPart::Leg,
    ];

    /// Stable snake_case code, used in state-file keys
    pub fn code(self) -> &'static str {
        match self {
            BodyPart::Shoulder => "shoulder",
            BodyPart::Chest => "chest",
            BodyPart::Back => "back",
            BodyPart::Arm => "arm",
            BodyPart::Abdominal => "abdominal",
            BodyPart::Hip => "hip",
            BodyPart::Leg => "leg",
        }
    }

    pub fn parse(code: &str) -> Option<BodyPart> {
        match code.to_lowercase().as_str() {
            "shoulder" => Some(BodyPart::Shoulder),
            "chest" => Some(BodyPart::Chest),
            "back" => Some(BodyPart::Back),
            "arm" => Some(BodyPart::Arm),
            "abdominal" | "abs" => Some(BodyPart::Abdominal),
            "hip" => Some(BodyPart::Hip),
            "leg" => Some(BodyPart::Leg),
            _ => None,
        }
    }
}

/// Bodyweight-relative performance tier, ordered weakest to strongest
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Challenger,
}

impl Grade {
    pub const ALL: [Grade; 7] = [
        Grade::Bronze,
        Grade::Silver,
        Grade::Gold,
        Grade::Platinum,
        Grade::Diamond,
        Grade::Master,
        Grade::Challenger,
    ];

    /// Multiplier exposed for experience scaling (1.0 at Bronze up to 4.0)
    pub fn multiplier(self) -> f64 {
        match self {
            Grade::Bronze => 1.0,
            Grade::Silver => 1.2,
            Grade::Gold => 1.5,
            Grade::Platinum => 2.0,
            Grade::Diamond => 2.5,
            Grade::Master => 3.0,
            Grade::Challenger => 4.0,
        }
    }

    /// Bonus rate applied on top of base experience
    pub fn bonus_rate(self) -> f64 {
        match self {
            Grade::Bronze => 0.0,
            Grade::Silver => 0.10,
            Grade::Gold => 0.25,
            Grade::Platinum => 0.50,
            Grade::Diamond => 0.75,
            Grade::Master => 1.0,
            Grade::Challenger => 1.5,
        }
    }
}

// ============================================================================
// Workout Entries
// ============================================================================

/// A single logged workout: one exercise performed for sets x reps at a weight.
///
/// Immutable once logged except for the `verified` flag.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutEntry {
    pub id: Uuid,
    pub subject_id: String,
    pub exercise_id: String,
    pub body_part: BodyPart,
    pub sets: u32,
    pub reps: u32,
    pub weight_kg: f64,
    /// Estimated single-rep max computed at submission time
    pub estimated_max: f64,
    pub grade: Grade,
    pub exp_gained: i64,
    pub calories: f64,
    pub performed_at: DateTime<Utc>,
    pub verified: bool,
}

// ============================================================================
// Progression State
// ============================================================================

/// Certification availability on a body-part aggregate
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CertificationState {
    #[default]
    None,
    Eligible,
    InProgress,
}

/// Per (subject, body part) progression aggregate.
///
/// Invariants: `level >= 1` and never decreases; after every processed entry
/// `current_exp < required_exp_for_level(level)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BodyPartProgress {
    pub level: u32,
    pub current_exp: i64,
    pub best_estimated_max: f64,
    #[serde(default)]
    pub certification: CertificationState,
    pub target_level: Option<u32>,
    pub last_workout_at: Option<DateTime<Utc>>,
}

impl Default for BodyPartProgress {
    fn default() -> Self {
        Self {
            level: 1,
            current_exp: 0,
            best_estimated_max: 0.0,
            certification: CertificationState::None,
            target_level: None,
            last_workout_at: None,
        }
    }
}

/// Rewards accrued through level-ups
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LevelRewards {
    pub skill_points: u32,
    pub titles: Vec<String>,
}

// ============================================================================
// Certification Types
// ============================================================================

/// Lifecycle status of a certification attempt
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Pending,
    InProgress,
    Submitted,
    Approved,
    Rejected,
}

impl AttemptStatus {
    /// Approved and Rejected are terminal; everything else blocks a new
    /// attempt on the same (subject, body part) key.
    pub fn is_terminal(self) -> bool {
        matches!(self, AttemptStatus::Approved | AttemptStatus::Rejected)
    }

    /// Validated transition table. Anything not listed here is rejected.
    pub fn can_transition(self, to: AttemptStatus) -> bool {
        use AttemptStatus::*;
        matches!(
            (self, to),
            (Pending, InProgress)
                | (InProgress, Submitted)
                | (InProgress, Rejected)
                | (Submitted, Approved)
                | (Submitted, Rejected)
        )
    }
}

/// What the subject must lift to pass a certification attempt
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PassConditions {
    pub exercise_id: String,
    pub exercise_name: String,
    pub required_weight_kg: f64,
    pub required_reps: u32,
    pub required_sets: u32,
}

/// A gated level-up challenge for one (subject, body part) key
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CertificationAttempt {
    pub id: Uuid,
    pub subject_id: String,
    pub body_part: BodyPart,
    pub current_level: u32,
    pub target_level: u32,
    pub conditions: PassConditions,
    pub status: AttemptStatus,
    pub workout_entry_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_ordering() {
        assert!(Grade::Bronze < Grade::Silver);
        assert!(Grade::Master < Grade::Challenger);

        let mut grades = vec![Grade::Gold, Grade::Bronze, Grade::Challenger];
        grades.sort();
        assert_eq!(
            grades,
            vec![Grade::Bronze, Grade::Gold, Grade::Challenger]
        );
    }

    #[test]
    fn test_grade_multipliers_increase() {
        let mut last = 0.0;
        for grade in Grade::ALL {
            assert!(grade.multiplier() > last);
            last = grade.multiplier();
        }
    }

    #[test]
    fn test_body_part_codes_roundtrip() {
        for part in BodyPart::ALL {
            assert_eq!(BodyPart::parse(part.code()), Some(part));
        }
        assert_eq!(BodyPart::parse("unknown"), None);
    }

    #[test]
    fn test_attempt_transition_table() {
        use AttemptStatus::*;

        assert!(Pending.can_transition(InProgress));
        assert!(InProgress.can_transition(Submitted));
        assert!(Submitted.can_transition(Approved));
        assert!(Submitted.can_transition(Rejected));

        // Absent from the table
        assert!(!Approved.can_transition(InProgress));
        assert!(!Rejected.can_transition(Submitted));
        assert!(!Pending.can_transition(Approved));
        assert!(!Submitted.can_transition(InProgress));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(AttemptStatus::Approved.is_terminal());
        assert!(AttemptStatus::Rejected.is_terminal());
        assert!(!AttemptStatus::InProgress.is_terminal());
        assert!(!AttemptStatus::Submitted.is_terminal());
    }
}

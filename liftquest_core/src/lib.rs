#![forbid(unsafe_code)]

//! Core domain model and business logic for the Liftquest progression system.
//!
//! This crate provides:
//! - Domain types (subjects, body parts, grades, workout entries, attempts)
//! - One-rep max estimation and bodyweight-relative grading
//! - Experience, level progression and calorie scoring
//! - Progressive overload recommendations
//! - The certification level-up workflow
//! - Persistence (record WAL, CSV archive, game state)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod estimator;
pub mod grader;
pub mod experience;
pub mod calories;
pub mod advisor;
pub mod progression;
pub mod certification;
pub mod records;
pub mod rollup;
pub mod store;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::find_exercise;
pub use config::Config;
pub use estimator::estimate_max;
pub use grader::evaluate_grade;
pub use experience::calculate_exp;
pub use calories::estimate_calories;
pub use advisor::recommend;
pub use progression::required_exp_for_level;
pub use records::{JsonlSink, RecordSink};
pub use store::GameState;
pub use engine::{Engine, SubmissionSummary, WorkoutSubmission};

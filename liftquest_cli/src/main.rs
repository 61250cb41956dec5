use clap::{Parser, Subcommand};
use liftquest_core::calories::{HeartRateData, WorkoutEffort};
use liftquest_core::engine::{Engine, WorkoutSubmission};
use liftquest_core::*;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "liftquest")]
#[command(about = "Workout scoring and progression engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage subject profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Log a workout and apply its experience
    Log {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        exercise: String,
        #[arg(long)]
        sets: u32,
        #[arg(long)]
        reps: u32,
        #[arg(long)]
        weight: f64,
        /// Perceived exertion, 1-10
        #[arg(long)]
        rpe: Option<u8>,
        /// Measured active minutes
        #[arg(long)]
        duration: Option<f64>,
        /// Average heart rate over the session (bpm)
        #[arg(long)]
        avg_hr: Option<f64>,
        /// Body part override for exercises not in the catalog
        #[arg(long)]
        body_part: Option<String>,
    },

    /// Estimate a one-rep max from a set
    Estimate {
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        reps: u32,
        /// Show every formula instead of just the recommended estimate
        #[arg(long)]
        all: bool,
    },

    /// Grade a lift against bodyweight thresholds
    Grade {
        #[arg(long)]
        bodyweight: f64,
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        exercise: String,
        #[arg(long)]
        reps: u32,
    },

    /// Estimate calories for a workout without logging it
    Calories {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        exercise: String,
        #[arg(long)]
        sets: u32,
        #[arg(long)]
        reps: u32,
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        rpe: Option<u8>,
        #[arg(long)]
        duration: Option<f64>,
        #[arg(long)]
        avg_hr: Option<f64>,
    },

    /// Recommend the next session for an exercise
    Recommend {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        exercise: String,
    },

    /// Certification workflow
    Cert {
        #[command(subcommand)]
        command: CertCommands,
    },

    /// Roll up WAL records to CSV
    Rollup {
        /// Clean up processed WAL files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Create or replace a subject profile
    Set {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        bodyweight: f64,
        /// male or female
        #[arg(long)]
        gender: String,
        #[arg(long)]
        age: Option<u32>,
    },
    /// Show a subject profile
    Show {
        #[arg(long)]
        subject: String,
    },
}

#[derive(Subcommand)]
enum CertCommands {
    /// Start a certification attempt for an eligible body part
    Start {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body_part: String,
    },
    /// Submit a logged workout as certification proof
    Submit {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        attempt: Uuid,
        #[arg(long)]
        entry: Uuid,
    },
    /// Show certification status for a body part
    Status {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body_part: String,
    },
}

fn main() -> Result<()> {
    liftquest_core::logging::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = dir;
    }
    let engine = Engine::new(config);

    match cli.command {
        Commands::Profile { command } => cmd_profile(&engine, command),
        Commands::Log {
            subject,
            exercise,
            sets,
            reps,
            weight,
            rpe,
            duration,
            avg_hr,
            body_part,
        } => cmd_log(
            &engine, subject, exercise, sets, reps, weight, rpe, duration, avg_hr, body_part,
        ),
        Commands::Estimate { weight, reps, all } => cmd_estimate(weight, reps, all),
        Commands::Grade {
            bodyweight,
            weight,
            exercise,
            reps,
        } => cmd_grade(bodyweight, weight, &exercise, reps),
        Commands::Calories {
            subject,
            exercise,
            sets,
            reps,
            weight,
            rpe,
            duration,
            avg_hr,
        } => cmd_calories(
            &engine, &subject, &exercise, sets, reps, weight, rpe, duration, avg_hr,
        ),
        Commands::Recommend { subject, exercise } => cmd_recommend(&engine, &subject, &exercise),
        Commands::Cert { command } => cmd_cert(&engine, command),
        Commands::Rollup { cleanup } => cmd_rollup(&engine, cleanup),
    }
}

fn parse_gender(input: &str) -> Result<Gender> {
    match input.to_lowercase().as_str() {
        "male" | "m" => Ok(Gender::Male),
        "female" | "f" => Ok(Gender::Female),
        other => Err(Error::Validation(format!(
            "unknown gender {other}; expected male or female"
        ))),
    }
}

fn parse_body_part(input: &str) -> Result<BodyPart> {
    BodyPart::parse(input)
        .ok_or_else(|| Error::Validation(format!("unknown body part {input}")))
}

fn cmd_profile(engine: &Engine, command: ProfileCommands) -> Result<()> {
    match command {
        ProfileCommands::Set {
            subject,
            bodyweight,
            gender,
            age,
        } => {
            if !(20.0..=400.0).contains(&bodyweight) {
                return Err(Error::Validation(format!(
                    "bodyweight {bodyweight}kg is out of range"
                )));
            }
            engine.set_profile(SubjectProfile {
                subject_id: subject.clone(),
                bodyweight_kg: bodyweight,
                gender: parse_gender(&gender)?,
                age,
            })?;
            println!("✓ Profile saved for {}", subject);
            Ok(())
        }
        ProfileCommands::Show { subject } => {
            let profile = engine.profile(&subject)?;
            println!("Subject:    {}", profile.subject_id);
            println!("Bodyweight: {} kg", profile.bodyweight_kg);
            println!("Gender:     {:?}", profile.gender);
            match profile.age {
                Some(age) => println!("Age:        {}", age),
                None => println!("Age:        -"),
            }
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_log(
    engine: &Engine,
    subject: String,
    exercise: String,
    sets: u32,
    reps: u32,
    weight: f64,
    rpe: Option<u8>,
    duration: Option<f64>,
    avg_hr: Option<f64>,
    body_part: Option<String>,
) -> Result<()> {
    let heart_rate = match (avg_hr, duration) {
        (Some(bpm), Some(minutes)) => Some(HeartRateData {
            average_bpm: bpm,
            duration_min: minutes,
        }),
        (Some(_), None) => {
            return Err(Error::Validation(
                "--avg-hr requires --duration".into(),
            ))
        }
        _ => None,
    };
    let body_part = body_part.as_deref().map(parse_body_part).transpose()?;

    let summary = engine.submit_workout(&WorkoutSubmission {
        subject_id: subject,
        exercise_id: exercise,
        sets,
        reps,
        weight_kg: weight,
        rpe,
        duration_min: duration,
        heart_rate,
        body_part,
    })?;

    println!("✓ Workout logged ({})", summary.entry.id);
    println!();
    println!("  Estimated 1RM: {} kg", summary.entry.estimated_max);
    println!(
        "  Grade:         {:?}{}",
        summary.entry.grade,
        if summary.personal_record { "  (PR!)" } else { "" }
    );
    println!("  Calories:      {} kcal", summary.calories.total_kcal);
    println!();
    println!("  Experience:    +{}", summary.exp.total);
    println!("    base {} / grade +{} / volume +{} / pr +{} / level {}",
        summary.exp.base,
        summary.exp.grade_bonus,
        summary.exp.volume_bonus,
        summary.exp.pr_bonus,
        summary.exp.level_penalty,
    );

    if summary.level_up.did_level_up() {
        println!();
        println!(
            "  ★ LEVEL UP: {} → {} ({})",
            summary.level_up.old_level,
            summary.level_up.new_level,
            summary.entry.body_part.code()
        );
        if summary.level_up.rewards.skill_points > 0 {
            println!(
                "    +{} skill point(s)",
                summary.level_up.rewards.skill_points
            );
        }
        for title in &summary.level_up.rewards.titles {
            println!("    Title earned: {}", title);
        }
    }

    println!();
    println!(
        "  {} level {}  ({} / {} exp)",
        summary.entry.body_part.code(),
        summary.progress.level,
        summary.progress.current_exp,
        required_exp_for_level(summary.progress.level)
    );
    if summary.progress.certification == CertificationState::Eligible {
        println!(
            "  ✦ Certification available for level {}",
            summary.progress.target_level.unwrap_or(summary.progress.level + 1)
        );
    }

    Ok(())
}

fn cmd_estimate(weight: f64, reps: u32, all: bool) -> Result<()> {
    let recommended = estimate_max(weight, reps, None)?;
    println!("Estimated 1RM: {} kg  ({} kg x {} reps)", recommended, weight, reps);

    if all {
        println!();
        for (formula, value) in estimator::estimate_all(weight, reps) {
            println!("  {:<10} {:>7.1} kg", format!("{:?}", formula), value);
        }
        println!(
            "  {:<10} {:>7.1} kg",
            "table",
            estimator::max_from_percentage(weight, reps)
        );
    }
    Ok(())
}

fn cmd_grade(bodyweight: f64, weight: f64, exercise: &str, reps: u32) -> Result<()> {
    let grade = evaluate_grade(bodyweight, weight, exercise, reps)?;
    println!(
        "Grade: {:?}  ({} kg x {} reps at {} kg bodyweight)",
        grade, weight, reps, bodyweight
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_calories(
    engine: &Engine,
    subject: &str,
    exercise: &str,
    sets: u32,
    reps: u32,
    weight: f64,
    rpe: Option<u8>,
    duration: Option<f64>,
    avg_hr: Option<f64>,
) -> Result<()> {
    let profile = engine.profile(subject)?;
    let heart_rate = match (avg_hr, duration) {
        (Some(bpm), Some(minutes)) => Some(HeartRateData {
            average_bpm: bpm,
            duration_min: minutes,
        }),
        _ => None,
    };

    let estimate = estimate_calories(
        profile.bodyweight_kg,
        profile.age,
        &WorkoutEffort {
            exercise_id: exercise.to_string(),
            sets,
            reps,
            weight_kg: weight,
            rpe,
            duration_min: duration,
            rest_seconds: None,
        },
        heart_rate.as_ref(),
    )?;

    println!("Calories: {} kcal  ({:?}, confidence {})",
        estimate.total_kcal, estimate.method, estimate.confidence);
    println!("  active {} / rest {} / after-burn {}",
        estimate.active_kcal, estimate.rest_kcal, estimate.epoc_kcal);
    Ok(())
}

fn cmd_recommend(engine: &Engine, subject: &str, exercise: &str) -> Result<()> {
    match engine.recommend_next(subject, exercise)? {
        None => {
            println!("No history for {} yet - log a workout first.", exercise);
        }
        Some(rec) => {
            println!("Next session for {}:", exercise);
            println!(
                "  {} kg x {} reps x {} sets  ({:?})",
                rec.next_weight_kg, rec.next_reps, rec.next_sets, rec.progression
            );
            println!("  {}", rec.reason);
            println!("  Expected RPE: {}", rec.expected_rpe);
            for warning in &rec.warnings {
                println!("  ⚠ {}", warning);
            }
        }
    }
    Ok(())
}

fn cmd_cert(engine: &Engine, command: CertCommands) -> Result<()> {
    match command {
        CertCommands::Start { subject, body_part } => {
            let body_part = parse_body_part(&body_part)?;
            let attempt = engine.start_certification(&subject, body_part)?;
            println!("✓ Certification attempt started ({})", attempt.id);
            println!(
                "  Target: {} level {} → {}",
                body_part.code(),
                attempt.current_level,
                attempt.target_level
            );
            println!(
                "  Pass condition: {} — {} kg x {} reps x {} sets",
                attempt.conditions.exercise_name,
                attempt.conditions.required_weight_kg,
                attempt.conditions.required_reps,
                attempt.conditions.required_sets
            );
            Ok(())
        }
        CertCommands::Submit {
            subject,
            attempt,
            entry,
        } => {
            use liftquest_core::certification::SubmitOutcome;
            match engine.submit_certification(&subject, attempt, entry)? {
                SubmitOutcome::Approved { new_level } => {
                    println!("✓ Certification approved - level {} reached!", new_level);
                }
                SubmitOutcome::AwaitingReview => {
                    println!("✓ Submitted - awaiting review.");
                }
                SubmitOutcome::ConditionsNotMet { shortfalls } => {
                    println!("✗ Conditions not met:");
                    for shortfall in &shortfalls {
                        println!("  - {}", shortfall);
                    }
                    println!("The attempt stays open - try again.");
                }
            }
            Ok(())
        }
        CertCommands::Status { subject, body_part } => {
            let body_part = parse_body_part(&body_part)?;
            let status = engine.certification_status(&subject, body_part)?;
            println!(
                "{} level {}  ({} / {} exp)",
                body_part.code(),
                status.progress.level,
                status.progress.current_exp,
                required_exp_for_level(status.progress.level)
            );
            println!("Certification: {:?}", status.progress.certification);
            if let Some(attempt) = status.active_attempt {
                println!(
                    "Open attempt {} ({:?}) - {} kg x {} reps x {} sets of {}",
                    attempt.id,
                    attempt.status,
                    attempt.conditions.required_weight_kg,
                    attempt.conditions.required_reps,
                    attempt.conditions.required_sets,
                    attempt.conditions.exercise_name
                );
            }
            Ok(())
        }
    }
}

fn cmd_rollup(engine: &Engine, cleanup: bool) -> Result<()> {
    let wal_path = engine.config().wal_path();
    if !wal_path.exists() {
        println!("No WAL file found - nothing to roll up.");
        return Ok(());
    }

    let count = engine.rollup()?;
    println!("✓ Rolled up {} records to CSV", count);
    println!("  CSV: {}", engine.config().csv_path().display());

    if cleanup {
        let cleaned =
            liftquest_core::rollup::cleanup_processed_wals(&engine.config().data.data_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed WAL files", cleaned);
        }
    }

    Ok(())
}

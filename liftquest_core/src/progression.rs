//! Level progression for body-part aggregates.
//!
//! One shared growth curve drives everything level-related: the cost to
//! advance from level L is `round(1000 * 1.15^(L-1))`. Experience awards
//! either level up automatically (possibly several levels from one award)
//! or, when certification gating is on, accrue until the subject passes a
//! certification attempt.

use crate::types::{BodyPartProgress, LevelRewards};

const BASE_EXP: f64 = 1000.0;
const GROWTH_FACTOR: f64 = 1.15;

/// Experience needed to advance from `level` to `level + 1`
pub fn required_exp_for_level(level: u32) -> i64 {
    (BASE_EXP * GROWTH_FACTOR.powi(level.saturating_sub(1) as i32)).round() as i64
}

/// Outcome of applying one experience award
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelUpResult {
    pub old_level: u32,
    pub new_level: u32,
    pub levels_gained: u32,
    pub remaining_exp: i64,
    pub rewards: LevelRewards,
}

impl LevelUpResult {
    pub fn did_level_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Add experience and apply every level-up it pays for.
///
/// A large award can clear several gates at once; each cleared gate
/// subtracts its cost before the next check, so the invariant
/// `current_exp < required_exp_for_level(level)` holds on return.
/// Milestone rewards: a skill point every 5th level, a title every 10th.
pub fn apply_exp(progress: &mut BodyPartProgress, exp_gained: i64) -> LevelUpResult {
    let old_level = progress.level;
    progress.current_exp += exp_gained;

    let mut rewards = LevelRewards::default();
    while progress.current_exp >= required_exp_for_level(progress.level) {
        progress.current_exp -= required_exp_for_level(progress.level);
        progress.level += 1;

        if progress.level % 5 == 0 {
            rewards.skill_points += 1;
        }
        if progress.level % 10 == 0 {
            rewards.titles.push(format!("Level {} reached", progress.level));
        }
    }

    LevelUpResult {
        old_level,
        new_level: progress.level,
        levels_gained: progress.level - old_level,
        remaining_exp: progress.current_exp,
        rewards,
    }
}

/// Accrue experience without levelling; advancement happens through
/// certification instead
pub fn accrue_exp(progress: &mut BodyPartProgress, exp_gained: i64) {
    progress.current_exp += exp_gained;
}

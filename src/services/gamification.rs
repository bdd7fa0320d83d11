//! XP accounting and level progression.
//!
//! Rewards are one-way: completing a task or pomodoro credits XP, and
//! un-completing never debits it. The award runs in the same transaction as
//! the triggering task write, so the task state and the user counters cannot
//! drift apart on partial failure.

use crate::DbConn;
use crate::{
    error::Result,
    models::users::User,
    queries::users,
};
use uuid::Uuid;

/// XP granted for completing a task.
pub const XP_PER_TASK: i64 = 10;
/// XP granted for completing a pomodoro cycle.
pub const XP_PER_POMODORO: i64 = 5;

const BASE_XP_FOR_LEVEL: f64 = 100.0;
const XP_MULTIPLIER: f64 = 1.5;

/// XP required to advance *into* the given level (level 2 costs 100,
/// each further level costs 1.5x the previous step, floored).
pub fn xp_for_level(level: i32) -> i64 {
    (BASE_XP_FOR_LEVEL * XP_MULTIPLIER.powi(level - 1)).floor() as i64
}

/// Level reached with the given total XP. Starts at level 1 with 0 XP.
pub fn level_for_xp(total_xp: i64) -> i32 {
    let mut level = 1;
    let mut required_xp: i64 = 0;

    while required_xp <= total_xp {
        level += 1;
        required_xp += xp_for_level(level);
    }

    level - 1
}

/// Credits the task-completion reward to a user.
///
/// Returns the updated user, or None when no user row exists (the reward is
/// skipped silently rather than failing the surrounding task update).
pub async fn award_task_completion(conn: &mut DbConn, user_id: Uuid) -> Result<Option<User>> {
    award(conn, user_id, XP_PER_TASK, 1, 0).await
}

/// Credits the pomodoro-completion reward to a user.
pub async fn award_pomodoro(conn: &mut DbConn, user_id: Uuid) -> Result<Option<User>> {
    award(conn, user_id, XP_PER_POMODORO, 0, 1).await
}

async fn award(
    conn: &mut DbConn,
    user_id: Uuid,
    xp_delta: i64,
    tasks_delta: i32,
    pomodoro_delta: i32,
) -> Result<Option<User>> {
    // Row lock so concurrent completions serialize instead of losing updates.
    let Some(user) = users::get_user_for_update(conn, user_id).await? else {
        tracing::warn!(user_id = %user_id, "Skipping XP award: user row missing");
        return Ok(None);
    };

    let new_xp = user.xp + xp_delta;
    let new_level = level_for_xp(new_xp);

    let updated = users::update_gamification(
        conn,
        user_id,
        new_xp,
        new_level,
        user.total_tasks_completed + tasks_delta,
        user.total_pomodoro_completed + pomodoro_delta,
    )
    .await?;

    Ok(Some(updated))
}

/// XP progress within the current level, for profile display.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct XpProgress {
    pub current_level: i32,
    pub current_level_xp: i64,
    pub next_level_xp: i64,
}

pub fn xp_progress(total_xp: i64) -> XpProgress {
    let current_level = level_for_xp(total_xp);
    let current_level_start: i64 = (2..=current_level).map(xp_for_level).sum();
    XpProgress {
        current_level,
        current_level_xp: total_xp - current_level_start,
        next_level_xp: xp_for_level(current_level + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xp_for_level_curve() {
        assert_eq!(xp_for_level(2), 150);
        assert_eq!(xp_for_level(3), 225);
        assert_eq!(xp_for_level(4), 337);
    }

    #[test]
    fn test_level_starts_at_one() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(149), 1);
    }

    #[test]
    fn test_level_advances_with_xp() {
        assert_eq!(level_for_xp(150), 2);
        assert_eq!(level_for_xp(374), 2);
        assert_eq!(level_for_xp(375), 3);
    }

    #[test]
    fn test_level_is_monotonic() {
        let mut previous = 0;
        for xp in (0..5_000).step_by(50) {
            let level = level_for_xp(xp);
            assert!(level >= previous, "level regressed at {} xp", xp);
            previous = level;
        }
    }

    #[test]
    fn test_xp_progress_within_level() {
        let progress = xp_progress(0);
        assert_eq!(progress.current_level, 1);
        assert_eq!(progress.current_level_xp, 0);
        assert_eq!(progress.next_level_xp, 150);

        let progress = xp_progress(200);
        assert_eq!(progress.current_level, 2);
        assert_eq!(progress.current_level_xp, 50);
        assert_eq!(progress.next_level_xp, 225);
    }

    #[test]
    fn test_ten_tasks_reach_level_one_boundary() {
        // 15 completed tasks at 10 XP each crosses the first level boundary.
        assert_eq!(level_for_xp(XP_PER_TASK * 14), 1);
        assert_eq!(level_for_xp(XP_PER_TASK * 15), 2);
    }
}

//! Points calculation

use common::models::{GameMode, Question};

/// Time bonus for a correct timed-mode answer.
///
/// Scales linearly from the full base value at 0 seconds down to nothing at
/// the timer limit. Answers at or past the limit earn no bonus.
pub fn time_bonus(base_points: u32, time_spent_ms: u64, timer_seconds: f64) -> u32 {
    if timer_seconds <= 0.0 {
        return 0;
    }
    let elapsed_secs = time_spent_ms as f64 / 1000.0;
    let remaining = (timer_seconds - elapsed_secs).max(0.0);
    ((remaining / timer_seconds) * base_points as f64).round() as u32
}

/// Points earned by one answer
pub fn points_for_answer(
    question: &Question,
    mode: GameMode,
    is_correct: bool,
    time_spent_ms: u64,
    timer_seconds: f64,
) -> u32 {
    if !is_correct {
        return 0;
    }

    let base = question.points();
    match mode {
        GameMode::Classic => base,
        GameMode::Timed => base + time_bonus(base, time_spent_ms, timer_seconds),
    }
}

/// Level reached with a points total, starting at level 1
pub fn level_for_points(total_points: u64, points_per_level: u32) -> u32 {
    (total_points / points_per_level.max(1) as u64) as u32 + 1
}

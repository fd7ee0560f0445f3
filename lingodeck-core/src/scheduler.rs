//! SM-2 scheduling: grade application, content-edit reset, and the initial state.
//!
//! Intervals past the second repetition are rounded with [`f64::round`]
//! (half away from zero), so an interval of 5 at ease factor 2.5 becomes 13.
//! Intervals never exceed [`MAX_INTERVAL`] days.

use crate::{
    CoreError, Grade, SchedulingState, EF_DEFAULT, EF_MIN, FIRST_INTERVAL, MAX_GRADE,
    MAX_INTERVAL, SECOND_INTERVAL,
};
use chrono::{DateTime, Duration, Utc};

fn clamp_ef(x: f64) -> f64 {
    x.max(EF_MIN)
}

fn next_ease_factor(ef: f64, grade: Grade) -> f64 {
    let miss = (MAX_GRADE - grade.value()) as f64;
    clamp_ef(ef + (0.1 - miss * (0.08 + miss * 0.02)))
}

/// State of a card that has never been reviewed, due immediately.
pub fn new_scheduling_state(now: DateTime<Utc>) -> SchedulingState {
    SchedulingState {
        interval: 0,
        repetition: 0,
        ease_factor: EF_DEFAULT,
        due_date: now,
    }
}

/// Applies a recall grade and returns the next state. `state` is left untouched;
/// out-of-range grades fail with [`CoreError::InvalidGrade`].
pub fn apply_grade(
    state: &SchedulingState,
    grade: i64,
    now: DateTime<Utc>,
) -> Result<SchedulingState, CoreError> {
    let grade = Grade::new(grade)?;
    apply_valid_grade(state, grade, now)
}

/// Fails with [`CoreError::DueDateOutOfRange`] only when `now` is so close to
/// the end of the calendar that the next due date cannot be represented.
pub fn apply_valid_grade(
    state: &SchedulingState,
    grade: Grade,
    now: DateTime<Utc>,
) -> Result<SchedulingState, CoreError> {
    let ease_factor = next_ease_factor(state.ease_factor, grade);

    let (repetition, interval) = if grade.is_pass() {
        let repetition = state.repetition.saturating_add(1);
        let interval = match repetition {
            1 => FIRST_INTERVAL,
            2 => SECOND_INTERVAL,
            _ => grown_interval(state.interval, ease_factor),
        };
        (repetition, interval)
    } else {
        (0, FIRST_INTERVAL)
    };

    let due_date = now
        .checked_add_signed(Duration::days(i64::from(interval)))
        .ok_or(CoreError::DueDateOutOfRange)?;

    Ok(SchedulingState {
        interval,
        repetition,
        ease_factor,
        due_date,
    })
}

fn grown_interval(interval: u32, ease_factor: f64) -> u32 {
    let days = (f64::from(interval) * ease_factor).round();
    days.min(f64::from(MAX_INTERVAL)) as u32
}

/// Edits to front or back text discard review history; anything else keeps it.
pub fn on_content_edit(
    state: &SchedulingState,
    content_changed: bool,
    now: DateTime<Utc>,
) -> SchedulingState {
    if content_changed {
        new_scheduling_state(now)
    } else {
        state.clone()
    }
}

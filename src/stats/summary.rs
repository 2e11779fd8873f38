use crate::calendar;
use crate::db::{DayRow, HabitHistory};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Counts are serialized as floats so ratio consumers can divide them
/// directly; an `amount` of zero is the consumer's problem, this engine
/// never divides.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub id: i64,
    pub date: NaiveDate,
    pub completed: f64,
    pub amount: f64,
}

/// One row per known day, whether or not anything references it:
/// `completed` is the number of completions recorded on it, `amount` the
/// number of habits due on it (scheduled for its weekday and created on
/// or before it). Row order carries no guarantee.
pub fn build_summary(
    days: &[DayRow],
    completions: &HashMap<i64, u32>,
    habits: &[HabitHistory],
) -> Vec<SummaryRow> {
    days.iter()
        .map(|day| {
            let week_day = calendar::weekday_index(day.date);
            let amount = habits
                .iter()
                .filter(|habit| {
                    habit.week_days.contains(&week_day)
                        && !calendar::is_after(habit.created_on, day.date)
                })
                .count();

            SummaryRow {
                id: day.id,
                date: day.date,
                completed: f64::from(completions.get(&day.id).copied().unwrap_or(0)),
                amount: amount as f64,
            }
        })
        .collect()
}

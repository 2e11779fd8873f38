pub mod streak;
pub mod summary;

use crate::calendar;
use crate::db::Database;
use anyhow::Result;
use streak::StreakRow;
use summary::SummaryRow;

pub fn habit_streaks(database: &Database) -> Result<Vec<StreakRow>> {
    let habits = database.list_habit_histories()?;

    Ok(streak::current_streaks(&habits, calendar::today()))
}

pub fn daily_summary(database: &Database) -> Result<Vec<SummaryRow>> {
    let days = database.list_days()?;
    let completions = database.completion_counts_by_day()?;
    let habits = database.list_habit_histories()?;

    Ok(summary::build_summary(&days, &completions, &habits))
}

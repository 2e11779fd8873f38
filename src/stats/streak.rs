use crate::calendar;
use crate::db::HabitHistory;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StreakRow {
    pub id: i64,
    pub title: String,
    pub count_consecutive: u32,
}

/// Consecutive completed days for one habit, walking backward from today
/// down to (but not including) the habit's creation day. Unscheduled
/// weekdays are transparent; the first scheduled day without a completion
/// ends the streak. Starting at today means a scheduled-but-unmarked
/// today breaks the streak immediately.
pub fn current_streak(habit: &HabitHistory, today: NaiveDate) -> u32 {
    let mut count = 0;
    let mut cursor = today;

    while calendar::is_after(cursor, habit.created_on) {
        if habit.week_days.contains(&calendar::weekday_index(cursor)) {
            let checked = habit
                .completed_days
                .iter()
                .any(|completed| calendar::is_same_day(*completed, cursor));

            if checked {
                count += 1;
            } else {
                break;
            }
        }

        cursor = calendar::previous_day(cursor);
    }

    count
}

/// One row per habit, in the order the habits were given (the gateway
/// supplies them newest first).
pub fn current_streaks(habits: &[HabitHistory], today: NaiveDate) -> Vec<StreakRow> {
    habits
        .iter()
        .map(|habit| StreakRow {
            id: habit.id,
            title: habit.title.clone(),
            count_consecutive: current_streak(habit, today),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{current_streak, current_streaks};
    use crate::db::HabitHistory;
    use chrono::NaiveDate;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn habit(
        created_on: NaiveDate,
        week_days: Vec<u8>,
        completed_days: Vec<NaiveDate>,
    ) -> HabitHistory {
        HabitHistory {
            id: 1,
            title: "Test habit".to_string(),
            created_on,
            week_days,
            completed_days,
        }
    }

    #[test]
    fn empty_schedule_yields_zero() {
        let subject = habit(
            day(2024, 1, 1),
            Vec::new(),
            vec![day(2024, 1, 10), day(2024, 1, 11)],
        );

        assert_eq!(current_streak(&subject, day(2024, 1, 18)), 0);
    }

    #[test]
    fn habit_created_today_yields_zero() {
        let today = day(2024, 1, 18);
        let subject = habit(today, vec![0, 1, 2, 3, 4, 5, 6], vec![today]);

        assert_eq!(current_streak(&subject, today), 0);
    }

    #[test]
    fn unmarked_scheduled_today_breaks_immediately() {
        // 2024-01-17 was a Wednesday; scheduled but not completed.
        let subject = habit(day(2024, 1, 1), vec![3], vec![day(2024, 1, 10)]);

        assert_eq!(current_streak(&subject, day(2024, 1, 17)), 0);
    }

    #[test]
    fn backward_scan_skips_unscheduled_days_and_stops_at_first_gap() {
        // Created on a Monday, due Mondays and Wednesdays. Completed the
        // last Wednesday, the last Monday and the Wednesday before that,
        // but not the Monday before that. Scanned from a Thursday.
        let subject = habit(
            day(2024, 1, 1),
            vec![1, 3],
            vec![day(2024, 1, 17), day(2024, 1, 15), day(2024, 1, 10)],
        );

        assert_eq!(current_streak(&subject, day(2024, 1, 18)), 3);
    }

    #[test]
    fn later_completion_cannot_hide_an_earlier_gap() {
        // Wednesday 2024-01-17 completed, but Monday 2024-01-15 was due
        // and missed: the scan stops there no matter what lies beyond.
        let subject = habit(
            day(2024, 1, 1),
            vec![1, 3],
            vec![day(2024, 1, 17), day(2024, 1, 10), day(2024, 1, 8)],
        );

        assert_eq!(current_streak(&subject, day(2024, 1, 18)), 1);
    }

    #[test]
    fn scan_excludes_the_creation_day_itself() {
        // Created Wednesday 2024-01-10 with a completion recorded on the
        // creation day; the boundary is strict, so only the following
        // Wednesday counts.
        let subject = habit(
            day(2024, 1, 10),
            vec![3],
            vec![day(2024, 1, 17), day(2024, 1, 10)],
        );

        assert_eq!(current_streak(&subject, day(2024, 1, 18)), 1);
    }

    #[test]
    fn rows_preserve_input_order() {
        let first = HabitHistory {
            id: 7,
            title: "Newer".to_string(),
            created_on: day(2024, 1, 5),
            week_days: vec![1],
            completed_days: Vec::new(),
        };
        let second = HabitHistory {
            id: 3,
            title: "Older".to_string(),
            created_on: day(2024, 1, 1),
            week_days: vec![1],
            completed_days: Vec::new(),
        };

        let rows = current_streaks(&[first, second], day(2024, 1, 18));
        assert_eq!(
            rows.iter().map(|row| row.id).collect::<Vec<_>>(),
            vec![7, 3]
        );
    }
}

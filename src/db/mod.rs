pub mod queries;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct HabitRow {
    pub id: i64,
    pub title: String,
    pub created_on: NaiveDate,
    pub week_days: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayRow {
    pub id: i64,
    pub date: NaiveDate,
}

/// A habit joined with its full completion-day history, the unit the
/// streak engine consumes.
#[derive(Debug, Clone)]
pub struct HabitHistory {
    pub id: i64,
    pub title: String,
    pub created_on: NaiveDate,
    pub week_days: Vec<u8>,
    pub completed_days: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Marked,
    Cleared,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create DB directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite DB: {}", path.display()))?;

        let database = Self { conn };
        database.init_schema()?;

        Ok(database)
    }

    pub fn init_schema(&self) -> Result<()> {
        queries::schema_statements()
            .iter()
            .try_for_each(|statement| {
                self.conn
                    .execute(statement, [])
                    .context("Failed to initialize schema")
                    .map(|_| ())
            })
    }

    /// Inserts a habit together with its weekday schedule in one
    /// transaction. Duplicate weekdays collapse via the UNIQUE constraint;
    /// the schedule is immutable after this call.
    pub fn create_habit(
        &mut self,
        title: &str,
        week_days: &[u8],
        created_on: NaiveDate,
    ) -> Result<HabitRow> {
        let transaction = self
            .conn
            .transaction()
            .context("Failed to start transaction")?;

        transaction
            .execute(
                "INSERT INTO habits (title, created_on) VALUES (?1, ?2)",
                params![title, created_on],
            )
            .context("Failed to insert habit")?;
        let habit_id = transaction.last_insert_rowid();

        week_days.iter().try_for_each(|week_day| {
            transaction
                .execute(
                    "INSERT OR IGNORE INTO habit_week_days (habit_id, week_day) VALUES (?1, ?2)",
                    params![habit_id, week_day],
                )
                .context("Failed to insert habit weekday")
                .map(|_| ())
        })?;

        transaction.commit().context("Failed to commit habit")?;

        self.find_habit(habit_id)?
            .context("Habit row missing after insert")
    }

    pub fn find_habit(&self, habit_id: i64) -> Result<Option<HabitRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, created_on FROM habits WHERE id = ?1",
                params![habit_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, NaiveDate>(2)?,
                    ))
                },
            )
            .ok();

        row.map(|(id, title, created_on)| {
            Ok(HabitRow {
                id,
                title,
                created_on,
                week_days: self.week_days_for(id)?,
            })
        })
        .transpose()
    }

    /// Habits "possible" on a date: created on or before it and scheduled
    /// for its weekday.
    pub fn habits_for_day(&self, date: NaiveDate, week_day: u8) -> Result<Vec<HabitRow>> {
        let mut statement = self.conn.prepare(
            "SELECT h.id, h.title, h.created_on
             FROM habits h
             WHERE h.created_on <= ?1
               AND EXISTS (
                 SELECT 1 FROM habit_week_days w
                 WHERE w.habit_id = h.id AND w.week_day = ?2
               )
             ORDER BY h.created_on ASC, h.id ASC",
        )?;

        let base = statement
            .query_map(params![date, week_day], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, NaiveDate>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query habits for day")?;

        base.into_iter()
            .map(|(id, title, created_on)| {
                Ok(HabitRow {
                    id,
                    title,
                    created_on,
                    week_days: self.week_days_for(id)?,
                })
            })
            .collect()
    }

    pub fn find_day(&self, date: NaiveDate) -> Result<Option<DayRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, date FROM days WHERE date = ?1",
                params![date],
                |row| {
                    Ok(DayRow {
                        id: row.get(0)?,
                        date: row.get(1)?,
                    })
                },
            )
            .ok();

        Ok(row)
    }

    /// Atomic conditional insert: at most one row per calendar day exists
    /// no matter how many callers race here.
    pub fn get_or_create_day(&self, date: NaiveDate) -> Result<DayRow> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO days (date) VALUES (?1)",
                params![date],
            )
            .context("Failed to insert day")?;

        self.find_day(date)?
            .context("Day row missing after insert")
    }

    pub fn find_completion(&self, day_id: i64, habit_id: i64) -> Result<Option<i64>> {
        let completion_id = self
            .conn
            .query_row(
                "SELECT id FROM day_habits WHERE day_id = ?1 AND habit_id = ?2",
                params![day_id, habit_id],
                |row| row.get(0),
            )
            .ok();

        Ok(completion_id)
    }

    pub fn insert_completion(&self, day_id: i64, habit_id: i64) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO day_habits (day_id, habit_id) VALUES (?1, ?2)",
                params![day_id, habit_id],
            )
            .context("Failed to insert completion")?;

        Ok(())
    }

    pub fn delete_completion(&self, completion_id: i64) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM day_habits WHERE id = ?1",
                params![completion_id],
            )
            .context("Failed to delete completion")?;

        Ok(())
    }

    /// Marks or clears the completion of a habit on a date. The whole
    /// sequence runs in one transaction so concurrent toggles of the same
    /// pair cannot both observe "absent" and double-insert; the UNIQUE
    /// constraint on (day_id, habit_id) backstops it.
    pub fn toggle_completion(&mut self, habit_id: i64, date: NaiveDate) -> Result<ToggleOutcome> {
        let transaction = self
            .conn
            .transaction()
            .context("Failed to start transaction")?;

        transaction
            .execute(
                "INSERT OR IGNORE INTO days (date) VALUES (?1)",
                params![date],
            )
            .context("Failed to insert day")?;
        let day_id: i64 = transaction
            .query_row("SELECT id FROM days WHERE date = ?1", params![date], |row| {
                row.get(0)
            })
            .context("Day row missing after insert")?;

        let existing: Option<i64> = transaction
            .query_row(
                "SELECT id FROM day_habits WHERE day_id = ?1 AND habit_id = ?2",
                params![day_id, habit_id],
                |row| row.get(0),
            )
            .ok();

        let outcome = match existing {
            Some(completion_id) => {
                transaction
                    .execute(
                        "DELETE FROM day_habits WHERE id = ?1",
                        params![completion_id],
                    )
                    .context("Failed to delete completion")?;
                ToggleOutcome::Cleared
            }
            None => {
                transaction
                    .execute(
                        "INSERT INTO day_habits (day_id, habit_id) VALUES (?1, ?2)",
                        params![day_id, habit_id],
                    )
                    .context("Failed to insert completion")?;
                ToggleOutcome::Marked
            }
        };

        transaction.commit().context("Failed to commit toggle")?;
        Ok(outcome)
    }

    pub fn completed_habit_ids(&self, day_id: i64) -> Result<Vec<i64>> {
        let mut statement = self
            .conn
            .prepare("SELECT habit_id FROM day_habits WHERE day_id = ?1 ORDER BY habit_id ASC")?;

        let ids = statement
            .query_map(params![day_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query completed habits")?;

        Ok(ids)
    }

    /// Every habit with its schedule and full completion-day history,
    /// newest habit first.
    pub fn list_habit_histories(&self) -> Result<Vec<HabitHistory>> {
        let mut statement = self
            .conn
            .prepare("SELECT id, title, created_on FROM habits ORDER BY created_on DESC, id DESC")?;

        let base = statement
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, NaiveDate>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query habits")?;

        base.into_iter()
            .map(|(id, title, created_on)| {
                Ok(HabitHistory {
                    id,
                    title,
                    created_on,
                    week_days: self.week_days_for(id)?,
                    completed_days: self.completed_days_for(id)?,
                })
            })
            .collect()
    }

    pub fn list_days(&self) -> Result<Vec<DayRow>> {
        let mut statement = self.conn.prepare("SELECT id, date FROM days")?;

        let rows = statement
            .query_map([], |row| {
                Ok(DayRow {
                    id: row.get(0)?,
                    date: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query days")?;

        Ok(rows)
    }

    pub fn completion_counts_by_day(&self) -> Result<HashMap<i64, u32>> {
        let mut statement = self
            .conn
            .prepare("SELECT day_id, COUNT(*) FROM day_habits GROUP BY day_id")?;

        let counts = statement
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, u32>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()
            .context("Failed to query completion counts")?;

        Ok(counts)
    }

    pub fn habit_count(&self) -> Result<u32> {
        self.count_rows("SELECT COUNT(*) FROM habits")
    }

    pub fn day_count(&self) -> Result<u32> {
        self.count_rows("SELECT COUNT(*) FROM days")
    }

    pub fn completion_count(&self) -> Result<u32> {
        self.count_rows("SELECT COUNT(*) FROM day_habits")
    }

    pub fn latest_completion_date(&self) -> Result<Option<NaiveDate>> {
        let date = self
            .conn
            .query_row(
                "SELECT d.date FROM day_habits dh
                 JOIN days d ON d.id = dh.day_id
                 ORDER BY d.date DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok();

        Ok(date)
    }

    fn count_rows(&self, sql: &str) -> Result<u32> {
        self.conn
            .query_row(sql, [], |row| row.get(0))
            .context("Failed to count rows")
    }

    fn week_days_for(&self, habit_id: i64) -> Result<Vec<u8>> {
        let mut statement = self.conn.prepare(
            "SELECT week_day FROM habit_week_days WHERE habit_id = ?1 ORDER BY week_day ASC",
        )?;

        let week_days = statement
            .query_map(params![habit_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query habit weekdays")?;

        Ok(week_days)
    }

    fn completed_days_for(&self, habit_id: i64) -> Result<Vec<NaiveDate>> {
        let mut statement = self.conn.prepare(
            "SELECT d.date FROM day_habits dh
             JOIN days d ON d.id = dh.day_id
             WHERE dh.habit_id = ?1
             ORDER BY d.date ASC",
        )?;

        let dates = statement
            .query_map(params![habit_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query completed days")?;

        Ok(dates)
    }
}

#[cfg(test)]
mod tests {
    use super::{Database, ToggleOutcome};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn open_test_database(dir: &tempfile::TempDir) -> Database {
        Database::open(&dir.path().join("habits.db")).expect("open database")
    }

    #[test]
    fn create_habit_collapses_duplicate_weekdays() {
        let dir = tempdir().expect("tempdir");
        let mut database = open_test_database(&dir);

        let habit = database
            .create_habit("Read", &[1, 3, 3, 1], day(2024, 1, 8))
            .expect("create habit");

        assert_eq!(habit.title, "Read");
        assert_eq!(habit.week_days, vec![1, 3]);
        assert_eq!(habit.created_on, day(2024, 1, 8));

        let found = database
            .find_habit(habit.id)
            .expect("find habit")
            .expect("habit exists");
        assert_eq!(found.week_days, vec![1, 3]);
    }

    #[test]
    fn find_habit_returns_none_for_unknown_id() {
        let dir = tempdir().expect("tempdir");
        let database = open_test_database(&dir);

        assert!(database.find_habit(42).expect("query ok").is_none());
    }

    #[test]
    fn get_or_create_day_is_idempotent() {
        let dir = tempdir().expect("tempdir");
        let database = open_test_database(&dir);

        let first = database
            .get_or_create_day(day(2024, 2, 1))
            .expect("create day");
        let second = database
            .get_or_create_day(day(2024, 2, 1))
            .expect("reuse day");

        assert_eq!(first.id, second.id);
        assert_eq!(database.day_count().expect("count"), 1);
    }

    #[test]
    fn toggle_marks_then_clears_and_keeps_the_day() {
        let dir = tempdir().expect("tempdir");
        let mut database = open_test_database(&dir);

        let habit = database
            .create_habit("Stretch", &[4], day(2024, 1, 1))
            .expect("create habit");

        let first = database
            .toggle_completion(habit.id, day(2024, 2, 1))
            .expect("first toggle");
        assert_eq!(first, ToggleOutcome::Marked);
        assert_eq!(database.completion_count().expect("count"), 1);

        let second = database
            .toggle_completion(habit.id, day(2024, 2, 1))
            .expect("second toggle");
        assert_eq!(second, ToggleOutcome::Cleared);
        assert_eq!(database.completion_count().expect("count"), 0);
        // The lazily created Day row is never deleted.
        assert!(
            database
                .find_day(day(2024, 2, 1))
                .expect("query ok")
                .is_some()
        );
    }

    #[test]
    fn completion_lookup_round_trip() {
        let dir = tempdir().expect("tempdir");
        let mut database = open_test_database(&dir);

        let habit = database
            .create_habit("Write", &[2], day(2024, 1, 1))
            .expect("create habit");
        let day_row = database
            .get_or_create_day(day(2024, 1, 9))
            .expect("create day");

        assert!(
            database
                .find_completion(day_row.id, habit.id)
                .expect("query ok")
                .is_none()
        );

        database
            .insert_completion(day_row.id, habit.id)
            .expect("insert completion");
        let completion_id = database
            .find_completion(day_row.id, habit.id)
            .expect("query ok")
            .expect("completion exists");
        assert_eq!(
            database.completed_habit_ids(day_row.id).expect("query ok"),
            vec![habit.id]
        );

        database
            .delete_completion(completion_id)
            .expect("delete completion");
        assert!(
            database
                .find_completion(day_row.id, habit.id)
                .expect("query ok")
                .is_none()
        );
    }

    #[test]
    fn habits_for_day_applies_weekday_and_creation_predicate() {
        let dir = tempdir().expect("tempdir");
        let mut database = open_test_database(&dir);

        // 2024-01-10 was a Wednesday (weekday 3).
        let scheduled = database
            .create_habit("Gym", &[3], day(2024, 1, 1))
            .expect("create habit");
        database
            .create_habit("Piano", &[5], day(2024, 1, 1))
            .expect("create habit");
        database
            .create_habit("Late", &[3], day(2024, 1, 11))
            .expect("create habit");
        let same_day = database
            .create_habit("Same day", &[3], day(2024, 1, 10))
            .expect("create habit");

        let possible = database
            .habits_for_day(day(2024, 1, 10), 3)
            .expect("query ok");
        let ids = possible.iter().map(|habit| habit.id).collect::<Vec<_>>();

        // Creation day itself counts; wrong weekday and later creation do not.
        assert_eq!(ids, vec![scheduled.id, same_day.id]);
    }

    #[test]
    fn habit_histories_are_newest_first_with_full_history() {
        let dir = tempdir().expect("tempdir");
        let mut database = open_test_database(&dir);

        let older = database
            .create_habit("Older", &[1], day(2024, 1, 1))
            .expect("create habit");
        let newer = database
            .create_habit("Newer", &[2], day(2024, 1, 5))
            .expect("create habit");

        database
            .toggle_completion(older.id, day(2024, 1, 8))
            .expect("toggle");
        database
            .toggle_completion(older.id, day(2024, 1, 15))
            .expect("toggle");

        let histories = database.list_habit_histories().expect("query ok");
        assert_eq!(
            histories.iter().map(|habit| habit.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );
        assert_eq!(
            histories[1].completed_days,
            vec![day(2024, 1, 8), day(2024, 1, 15)]
        );
        assert!(histories[0].completed_days.is_empty());
    }

    #[test]
    fn completion_counts_group_by_day() {
        let dir = tempdir().expect("tempdir");
        let mut database = open_test_database(&dir);

        let first = database
            .create_habit("One", &[1], day(2024, 1, 1))
            .expect("create habit");
        let second = database
            .create_habit("Two", &[1], day(2024, 1, 1))
            .expect("create habit");

        database
            .toggle_completion(first.id, day(2024, 1, 8))
            .expect("toggle");
        database
            .toggle_completion(second.id, day(2024, 1, 8))
            .expect("toggle");
        database
            .toggle_completion(first.id, day(2024, 1, 15))
            .expect("toggle");

        let day_ids = database
            .list_days()
            .expect("query ok")
            .into_iter()
            .map(|row| (row.date, row.id))
            .collect::<HashMap<_, _>>();
        let counts = database.completion_counts_by_day().expect("query ok");

        assert_eq!(counts.get(&day_ids[&day(2024, 1, 8)]), Some(&2));
        assert_eq!(counts.get(&day_ids[&day(2024, 1, 15)]), Some(&1));
        assert_eq!(
            database.latest_completion_date().expect("query ok"),
            Some(day(2024, 1, 15))
        );
    }
}

pub const CREATE_HABITS: &str = r#"
CREATE TABLE IF NOT EXISTS habits (
  id         INTEGER PRIMARY KEY AUTOINCREMENT,
  title      TEXT NOT NULL,
  created_on TEXT NOT NULL
);
"#;

pub const CREATE_HABIT_WEEK_DAYS: &str = r#"
CREATE TABLE IF NOT EXISTS habit_week_days (
  id       INTEGER PRIMARY KEY AUTOINCREMENT,
  habit_id INTEGER NOT NULL REFERENCES habits(id),
  week_day INTEGER NOT NULL,
  UNIQUE(habit_id, week_day)
);
"#;

pub const CREATE_DAYS: &str = r#"
CREATE TABLE IF NOT EXISTS days (
  id   INTEGER PRIMARY KEY AUTOINCREMENT,
  date TEXT NOT NULL UNIQUE
);
"#;

pub const CREATE_DAY_HABITS: &str = r#"
CREATE TABLE IF NOT EXISTS day_habits (
  id       INTEGER PRIMARY KEY AUTOINCREMENT,
  day_id   INTEGER NOT NULL REFERENCES days(id),
  habit_id INTEGER NOT NULL REFERENCES habits(id),
  UNIQUE(day_id, habit_id)
);
"#;

pub const INDEX_HABIT_WEEK_DAYS_HABIT_ID: &str =
    "CREATE INDEX IF NOT EXISTS idx_habit_week_days_habit_id ON habit_week_days(habit_id);";

pub const INDEX_DAY_HABITS_DAY_ID: &str =
    "CREATE INDEX IF NOT EXISTS idx_day_habits_day_id ON day_habits(day_id);";

pub const INDEX_DAY_HABITS_HABIT_ID: &str =
    "CREATE INDEX IF NOT EXISTS idx_day_habits_habit_id ON day_habits(habit_id);";

pub fn schema_statements() -> Vec<&'static str> {
    vec![
        CREATE_HABITS,
        CREATE_HABIT_WEEK_DAYS,
        CREATE_DAYS,
        CREATE_DAY_HABITS,
        INDEX_HABIT_WEEK_DAYS_HABIT_ID,
        INDEX_DAY_HABITS_DAY_ID,
        INDEX_DAY_HABITS_HABIT_ID,
    ]
}

use crate::calendar;
use crate::config::Config;
use crate::db::{Database, HabitRow, ToggleOutcome};
use crate::stats;
use crate::stats::streak::StreakRow;
use crate::stats::summary::SummaryRow;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/status", get(status))
        .route("/api/v1/habits", post(create_habit))
        .route("/api/v1/habits/:id/toggle/:date", patch(toggle_habit))
        .route("/api/v1/day", get(day_detail))
        .route("/api/v1/streaks", get(streaks))
        .route("/api/v1/summary", get(summary))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CreateHabitPayload {
    title: String,
    week_days: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct DayQuery {
    date: String,
}

#[derive(Debug, Serialize)]
struct DayPayload {
    date: String,
    possible_habits: Vec<HabitRow>,
    completed_habits: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct TogglePayload {
    habit_id: i64,
    date: String,
    completed: bool,
}

#[derive(Debug, Serialize)]
struct StreaksPayload {
    streaks: Vec<StreakRow>,
}

#[derive(Debug, Serialize)]
struct SummaryPayload {
    summary: Vec<SummaryRow>,
}

#[derive(Debug, Serialize)]
struct StatusPayload {
    habit_count: u32,
    day_count: u32,
    completion_count: u32,
    latest_completion_date: Option<String>,
    api_port: u16,
}

async fn status(State(state): State<ApiState>) -> ApiResult<Json<StatusPayload>> {
    let database = Database::open(&state.config.db_path)?;

    let payload = StatusPayload {
        habit_count: database.habit_count()?,
        day_count: database.day_count()?,
        completion_count: database.completion_count()?,
        latest_completion_date: database.latest_completion_date()?.map(calendar::format_day),
        api_port: state.config.api_port,
    };

    Ok(Json(payload))
}

async fn create_habit(
    State(state): State<ApiState>,
    Json(payload): Json<CreateHabitPayload>,
) -> ApiResult<Json<HabitRow>> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    if let Some(invalid) = payload.week_days.iter().find(|week_day| **week_day > 6) {
        return Err(ApiError::BadRequest(format!(
            "week_day out of range 0-6: {invalid}"
        )));
    }

    let mut database = Database::open(&state.config.db_path)?;
    let habit = database.create_habit(title, &payload.week_days, calendar::today())?;

    Ok(Json(habit))
}

async fn day_detail(
    State(state): State<ApiState>,
    Query(query): Query<DayQuery>,
) -> ApiResult<Json<DayPayload>> {
    let date = parse_request_date(&query.date)?;

    let database = Database::open(&state.config.db_path)?;
    let possible_habits = database.habits_for_day(date, calendar::weekday_index(date))?;
    let completed_habits = match database.find_day(date)? {
        Some(day) => database.completed_habit_ids(day.id)?,
        None => Vec::new(),
    };

    Ok(Json(DayPayload {
        date: calendar::format_day(date),
        possible_habits,
        completed_habits,
    }))
}

async fn toggle_habit(
    State(state): State<ApiState>,
    Path((habit_id, date)): Path<(i64, String)>,
) -> ApiResult<Json<TogglePayload>> {
    let date = parse_request_date(&date)?;

    let mut database = Database::open(&state.config.db_path)?;
    if database.find_habit(habit_id)?.is_none() {
        return Err(ApiError::NotFound(format!(
            "No habit found with id: {habit_id}"
        )));
    }

    let outcome = database.toggle_completion(habit_id, date)?;

    Ok(Json(TogglePayload {
        habit_id,
        date: calendar::format_day(date),
        completed: outcome == ToggleOutcome::Marked,
    }))
}

async fn streaks(State(state): State<ApiState>) -> ApiResult<Json<StreaksPayload>> {
    let database = Database::open(&state.config.db_path)?;
    let streaks = stats::habit_streaks(&database)?;

    Ok(Json(StreaksPayload { streaks }))
}

async fn summary(State(state): State<ApiState>) -> ApiResult<Json<SummaryPayload>> {
    let database = Database::open(&state.config.db_path)?;
    let summary = stats::daily_summary(&database)?;

    Ok(Json(SummaryPayload { summary }))
}

fn parse_request_date(input: &str) -> Result<chrono::NaiveDate, ApiError> {
    calendar::parse_day(input).map_err(|error| ApiError::BadRequest(error.to_string()))
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
        }
    }
}

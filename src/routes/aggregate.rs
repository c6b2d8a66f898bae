use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use time::{Date, macros::format_description};

use crate::{
    dto::aggregate::DailyAggregateView, error::AppError, services::aggregate_service,
    state::SharedState,
};

/// Routes for on-demand daily aggregate maintenance.
pub fn router() -> Router<SharedState> {
    Router::new().route("/aggregates/{date}", post(recompute_day))
}

/// Recompute the aggregate row for one calendar day; safe to re-run.
#[utoipa::path(
    post,
    path = "/aggregates/{date}",
    tag = "aggregate",
    params(("date" = String, Path, description = "Calendar day, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Aggregate recomputed", body = DailyAggregateView),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn recompute_day(
    State(state): State<SharedState>,
    Path(date): Path<String>,
) -> Result<Json<DailyAggregateView>, AppError> {
    let date = parse_date(&date)?;
    let view = aggregate_service::recompute_day(&state, date).await?;
    Ok(Json(view))
}

fn parse_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::BadRequest(format!("malformed date `{raw}`, expected YYYY-MM-DD")))
}

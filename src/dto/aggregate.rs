use serde::Serialize;
use time::{Date, macros::format_description};
use utoipa::ToSchema;

use crate::dao::models::DailyAggregateEntity;

/// Public projection of a daily aggregate row.
#[derive(Debug, Serialize, ToSchema)]
pub struct DailyAggregateView {
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    /// Highest score of the day, 0 if no session finished.
    pub best_score: u32,
    /// Mean score of the day, 0.0 if no session finished.
    pub avg_score: f64,
}

impl From<DailyAggregateEntity> for DailyAggregateView {
    fn from(entity: DailyAggregateEntity) -> Self {
        Self {
            date: format_date(entity.date),
            best_score: entity.best_score,
            avg_score: entity.avg_score,
        }
    }
}

fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn test_view_formats_date() {
        let view: DailyAggregateView = DailyAggregateEntity {
            date: date!(2026 - 08 - 20),
            best_score: 100,
            avg_score: 75.0,
        }
        .into();
        assert_eq!(view.date, "2026-08-20");
    }
}

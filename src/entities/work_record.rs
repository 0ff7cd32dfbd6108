use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One day of attendance for a teacher. Hours are derived from the
/// start/end times, never stored.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teacher_work_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub teacher_id: Uuid,

    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,

    pub memo: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Hours worked, rounded to two decimal places. Shifts that end past
    /// midnight wrap: the duration is (end - start) mod 24h.
    pub fn work_hours(&self) -> Decimal {
        work_hours_between(self.start_time, self.end_time)
    }
}

/// (end - start) mod 24h, in hours rounded to two decimal places.
pub fn work_hours_between(start: NaiveTime, end: NaiveTime) -> Decimal {
    let mut secs = end.signed_duration_since(start).num_seconds();
    if secs < 0 {
        secs += 24 * 3600;
    }
    (Decimal::new(secs, 0) / Decimal::new(3600, 0)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn same_day_shift() {
        assert_eq!(work_hours_between(t(9, 0), t(17, 30)), Decimal::new(850, 2));
    }

    #[test]
    fn overnight_shift_wraps_past_midnight() {
        assert_eq!(work_hours_between(t(22, 0), t(2, 0)), Decimal::from(4));
    }

    #[test]
    fn zero_length_shift() {
        assert_eq!(work_hours_between(t(10, 0), t(10, 0)), Decimal::ZERO);
    }

    #[test]
    fn rounds_to_two_decimals() {
        // 9:00 to 9:50 is 50 minutes = 0.8333... hours
        assert_eq!(work_hours_between(t(9, 0), t(9, 50)), Decimal::new(83, 2));
    }
}

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::student::Gender;

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum TeacherStatus {
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Leave")]
    Leave,
    #[sea_orm(string_value = "Resigned")]
    Resigned,
}

/// A teacher employed by the academy, paid hourly at `base_pay` with a
/// fixed monthly `extra_pay` allowance.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teachers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    pub gender: Gender,
    pub phone: String,
    pub email: Option<String>,

    pub status: TeacherStatus,

    pub hire_date: NaiveDate,
    pub resign_date: Option<NaiveDate>,

    /// Hourly rate in whole currency units (KRW)
    pub base_pay: i64,
    /// Fixed monthly allowance on top of hourly wages
    pub extra_pay: i64,

    pub bank_name: String,
    pub account_number: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the teacher was already employed at any point in the given
    /// calendar month.
    pub fn hired_by_month(&self, year: i32, month: u32) -> bool {
        let hired = self.hire_date;
        (hired.year(), hired.month()) <= (year, month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn teacher_hired(date: NaiveDate) -> Model {
        Model {
            id: Uuid::new_v4(),
            name: "Kim".into(),
            gender: Gender::Female,
            phone: "010-0000-0000".into(),
            email: None,
            status: TeacherStatus::Active,
            hire_date: date,
            resign_date: None,
            base_pay: 15000,
            extra_pay: 0,
            bank_name: "Bank".into(),
            account_number: "111-222".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn hired_by_month_compares_year_then_month() {
        let t = teacher_hired(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert!(t.hired_by_month(2025, 3));
        assert!(t.hired_by_month(2025, 4));
        assert!(t.hired_by_month(2026, 1));
        assert!(!t.hired_by_month(2025, 2));
        assert!(!t.hired_by_month(2024, 12));
    }
}

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Settled payroll for one teacher in one calendar month. Unique on
/// (teacher_id, year, month); re-settling replaces the amount.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teacher_payment_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub teacher_id: Uuid,

    pub year: i32,
    pub month: i32,

    /// Total paid out in whole currency units (KRW)
    pub amount_paid: i64,

    pub payment_date: NaiveDate,

    pub is_paid: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

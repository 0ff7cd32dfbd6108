use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A sale of books to a student. While `is_paid` is false the sale total
/// is reflected in the student's `unpaid_amount` balance.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub student_id: Uuid,
    pub book_id: Uuid,

    pub sale_date: NaiveDate,

    /// Unit price at time of sale in whole currency units (KRW)
    pub unit_price: i64,
    pub quantity: i32,

    pub is_paid: bool,
    pub payment_date: Option<NaiveDate>,

    pub memo: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn total_price(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }
}

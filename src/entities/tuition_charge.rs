use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A tuition charge against a student for one billing month of a class.
/// While `is_paid` is false the amount is reflected in the student's
/// `unpaid_amount` balance.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tuition_charges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub student_id: Uuid,
    pub class_id: Uuid,

    /// Date the charge was issued; drives proration for mid-month starts
    pub charge_date: NaiveDate,

    /// Charged amount in whole currency units (KRW), possibly prorated
    pub amount: i64,

    /// Billing month in "YYYY-MM" form
    pub billing_month: String,

    pub memo: Option<String>,

    pub is_paid: bool,
    pub payment_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Enrollment lifecycle of a student
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum StudentStatus {
    #[sea_orm(string_value = "Attending")]
    Attending,
    #[sea_orm(string_value = "Break")]
    Break,
    #[sea_orm(string_value = "Discharged")]
    Discharged,
    #[sea_orm(string_value = "Graduated")]
    Graduated,
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Gender {
    #[sea_orm(string_value = "Male")]
    Male,
    #[sea_orm(string_value = "Female")]
    Female,
}

/// A registered student. `unpaid_amount` is a running balance kept in sync
/// with unpaid tuition charges and unpaid book sales by the billing and
/// bookstore services.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Randomly assigned 8-digit identifier, unique across students
    pub student_number: i64,

    pub name: String,
    pub school: Option<String>,
    pub grade: String,
    pub gender: Gender,

    pub student_phone: Option<String>,
    pub parent_phone: Option<String>,
    pub email: Option<String>,

    pub first_class_date: Option<NaiveDate>,
    pub last_class_date: Option<NaiveDate>,

    pub memo: Option<String>,
    pub status: StudentStatus,

    /// Outstanding balance in whole currency units (KRW)
    pub unpaid_amount: i64,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn has_outstanding_balance(&self) -> bool {
        self.unpaid_amount > 0
    }
}

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A book stocked by the academy bookstore. `stock` mirrors the sum of
/// signed stock entry quantities minus units sold; `cost_price` always
/// holds the unit cost of the most recent restock.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,
    pub isbn: String,
    pub author: Option<String>,
    pub publisher: Option<String>,

    pub supplier_id: Option<Uuid>,

    /// Publisher list price in whole currency units (KRW)
    pub list_price: i64,
    /// Unit cost from the latest restock
    pub cost_price: i64,
    /// Price charged to students
    pub sale_price: i64,

    pub stock: i32,

    pub memo: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One append-only movement in a book's stock ledger. Positive quantities
/// are restocks, negative quantities are returns to the supplier.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_stock_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub book_id: Uuid,
    pub supplier_id: Option<Uuid>,

    /// Signed quantity; never zero
    pub quantity: i32,

    /// Unit cost in whole currency units (KRW)
    pub unit_cost: i64,

    /// Amount owed to (or refunded by) the supplier for this entry,
    /// always non-negative
    pub total_payment: i64,

    pub is_paid: bool,
    pub payment_date: Option<NaiveDate>,

    pub memo: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_restock(&self) -> bool {
        self.quantity > 0
    }
}

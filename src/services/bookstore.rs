use crate::{
    db::DbPool,
    entities::{
        book::{self, Entity as Book},
        book_sale::{self, Entity as BookSale},
        book_stock_entry::{self, Entity as BookStockEntry},
        book_supplier::{self, Entity as BookSupplier},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::billing::{apply_balance_delta, find_student},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{Set, TransactionTrait, *};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub list_price: i64,
    pub cost_price: i64,
    pub sale_price: i64,
    /// Starting quantity; a non-zero value is recorded as the first
    /// stock entry
    pub initial_stock: i32,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<Option<String>>,
    pub publisher: Option<Option<String>>,
    pub supplier_id: Option<Option<Uuid>>,
    pub list_price: Option<i64>,
    pub sale_price: Option<i64>,
    pub memo: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub name: String,
    pub registration_number: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_owner: Option<String>,
}

/// A stock movement request; quantity sign is fixed by the calling
/// operation.
#[derive(Debug, Clone)]
pub struct StockMovement {
    pub quantity: i32,
    pub unit_cost: i64,
    pub supplier_id: Option<Uuid>,
    /// Overrides the derived `abs(quantity * unit_cost)` when set
    pub total_payment: Option<i64>,
    pub is_paid: bool,
    pub payment_date: Option<NaiveDate>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSale {
    pub student_id: Uuid,
    pub book_id: Uuid,
    pub quantity: i32,
    /// Defaults to the book's sale price when unset
    pub unit_price: Option<i64>,
    pub sale_date: NaiveDate,
    pub is_paid: bool,
    pub memo: Option<String>,
}

/// Supplier ledger: unpaid purchases, unpaid returns, settled history.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SupplierStatement {
    pub supplier: book_supplier::Model,
    pub unpaid_stock_ins: Vec<book_stock_entry::Model>,
    pub unpaid_returns: Vec<book_stock_entry::Model>,
    pub paid_entries: Vec<book_stock_entry::Model>,
    /// Net amount owed: unpaid purchases minus unpaid return credits
    pub unpaid_total: i64,
}

pub struct BookstoreService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl BookstoreService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    // ---- suppliers -------------------------------------------------------

    pub async fn create_supplier(
        &self,
        new: NewSupplier,
    ) -> Result<book_supplier::Model, ServiceError> {
        book_supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            registration_number: Set(new.registration_number),
            phone: Set(new.phone),
            address: Set(new.address),
            bank_name: Set(new.bank_name),
            account_number: Set(new.account_number),
            account_owner: Set(new.account_owner),
            created_at: Set(Utc::now()),
        }
        .insert(self.db_pool.as_ref())
        .await
        .map_err(ServiceError::db_error)
    }

    pub async fn get_supplier(&self, id: Uuid) -> Result<book_supplier::Model, ServiceError> {
        BookSupplier::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {} not found", id)))
    }

    pub async fn list_suppliers(&self) -> Result<Vec<book_supplier::Model>, ServiceError> {
        BookSupplier::find()
            .order_by_asc(book_supplier::Column::Name)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn delete_supplier(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        self.get_supplier(id).await?;

        let has_entries = BookStockEntry::find()
            .filter(book_stock_entry::Column::SupplierId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if has_entries > 0 {
            return Err(ServiceError::InvalidOperation(
                "supplier has recorded stock entries".to_string(),
            ));
        }

        BookSupplier::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(())
    }

    /// The supplier's ledger view used for settlement runs.
    pub async fn supplier_statement(
        &self,
        supplier_id: Uuid,
    ) -> Result<SupplierStatement, ServiceError> {
        let db = self.db_pool.as_ref();
        let supplier = self.get_supplier(supplier_id).await?;

        let entries = BookStockEntry::find()
            .filter(book_stock_entry::Column::SupplierId.eq(supplier_id))
            .order_by_desc(book_stock_entry::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut unpaid_stock_ins = Vec::new();
        let mut unpaid_returns = Vec::new();
        let mut paid_entries = Vec::new();
        let mut unpaid_total = 0i64;

        for entry in entries {
            if entry.is_paid {
                paid_entries.push(entry);
            } else if entry.is_restock() {
                unpaid_total += entry.total_payment;
                unpaid_stock_ins.push(entry);
            } else {
                unpaid_total -= entry.total_payment;
                unpaid_returns.push(entry);
            }
        }

        Ok(SupplierStatement {
            supplier,
            unpaid_stock_ins,
            unpaid_returns,
            paid_entries,
            unpaid_total,
        })
    }

    /// Marks stock entries as settled with the supplier. Never touches
    /// book stock. Returns the number of entries flipped.
    pub async fn settle_supplier_entries(
        &self,
        entry_ids: Vec<Uuid>,
        payment_date: Option<NaiveDate>,
    ) -> Result<u64, ServiceError> {
        let payment_date = payment_date.ok_or_else(|| {
            ServiceError::ValidationError("payment date is required".to_string())
        })?;
        let db = self.db_pool.as_ref();

        let settled_ids = db
            .transaction::<_, Vec<Uuid>, ServiceError>(move |txn| {
                Box::pin(async move {
                    let mut settled_ids = Vec::new();
                    for entry_id in entry_ids {
                        let entry = find_stock_entry(txn, entry_id).await?;
                        if entry.is_paid {
                            continue;
                        }
                        let mut active: book_stock_entry::ActiveModel = entry.into();
                        active.is_paid = Set(true);
                        active.payment_date = Set(Some(payment_date));
                        active.update(txn).await.map_err(ServiceError::db_error)?;
                        settled_ids.push(entry_id);
                    }
                    Ok(settled_ids)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        let count = settled_ids.len() as u64;
        info!(count, "supplier entries settled");
        for entry_id in settled_ids {
            if let Err(e) = self
                .event_sender
                .send(Event::SupplierEntrySettled(entry_id))
                .await
            {
                warn!("failed to publish bookstore event: {}", e);
            }
        }
        Ok(count)
    }

    /// Reverts supplier settlement on the given entries.
    pub async fn cancel_supplier_settlement(
        &self,
        entry_ids: Vec<Uuid>,
    ) -> Result<u64, ServiceError> {
        let db = self.db_pool.as_ref();

        db.transaction::<_, u64, ServiceError>(move |txn| {
            Box::pin(async move {
                let mut count = 0u64;
                for entry_id in entry_ids {
                    let entry = find_stock_entry(txn, entry_id).await?;
                    if !entry.is_paid {
                        continue;
                    }
                    let mut active: book_stock_entry::ActiveModel = entry.into();
                    active.is_paid = Set(false);
                    active.payment_date = Set(None);
                    active.update(txn).await.map_err(ServiceError::db_error)?;
                    count += 1;
                }
                Ok(count)
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }

    // ---- books -----------------------------------------------------------

    /// Registers a book. Stock is seeded at zero; a non-zero starting
    /// quantity goes through the stock ledger like any other movement.
    pub async fn create_book(&self, new: NewBook) -> Result<book::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let duplicate = Book::find()
            .filter(book::Column::Isbn.eq(new.isbn.clone()))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if duplicate > 0 {
            return Err(ServiceError::Conflict(format!(
                "A book with ISBN {} already exists",
                new.isbn
            )));
        }

        let created = db
            .transaction::<_, book::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let book = book::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        title: Set(new.title),
                        isbn: Set(new.isbn),
                        author: Set(new.author),
                        publisher: Set(new.publisher),
                        supplier_id: Set(new.supplier_id),
                        list_price: Set(new.list_price),
                        cost_price: Set(new.cost_price),
                        sale_price: Set(new.sale_price),
                        stock: Set(0),
                        memo: Set(new.memo),
                        created_at: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    if new.initial_stock != 0 {
                        let movement = StockMovement {
                            quantity: new.initial_stock,
                            unit_cost: book.cost_price,
                            supplier_id: book.supplier_id,
                            total_payment: None,
                            is_paid: false,
                            payment_date: None,
                            memo: Some("initial stock".to_string()),
                        };
                        let (_, book) = apply_stock_movement(txn, book, movement).await?;
                        return Ok(book);
                    }

                    Ok(book)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if let Err(e) = self.event_sender.send(Event::BookCreated(created.id)).await {
            warn!("failed to publish bookstore event: {}", e);
        }

        Ok(created)
    }

    pub async fn get_book(&self, id: Uuid) -> Result<book::Model, ServiceError> {
        Book::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Book {} not found", id)))
    }

    /// Lists books with optional title/isbn/author search, paginated.
    pub async fn list_books(
        &self,
        search: Option<String>,
        page: u64,
        per_page: Option<u64>,
    ) -> Result<(Vec<book::Model>, u64), ServiceError> {
        let db = self.db_pool.as_ref();
        let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

        let mut query = Book::find().order_by_asc(book::Column::Title);
        if let Some(term) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", term.trim());
            query = query.filter(
                Condition::any()
                    .add(book::Column::Title.like(pattern.clone()))
                    .add(book::Column::Isbn.like(pattern.clone()))
                    .add(book::Column::Author.like(pattern)),
            );
        }

        let paginator = query.paginate(db, per_page);
        let total_pages = paginator
            .num_pages()
            .await
            .map_err(ServiceError::db_error)?;
        let books = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((books, total_pages))
    }

    pub async fn update_book(
        &self,
        id: Uuid,
        changes: BookChanges,
    ) -> Result<book::Model, ServiceError> {
        let existing = self.get_book(id).await?;
        let mut active: book::ActiveModel = existing.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(author) = changes.author {
            active.author = Set(author);
        }
        if let Some(publisher) = changes.publisher {
            active.publisher = Set(publisher);
        }
        if let Some(supplier_id) = changes.supplier_id {
            active.supplier_id = Set(supplier_id);
        }
        if let Some(price) = changes.list_price {
            active.list_price = Set(price);
        }
        if let Some(price) = changes.sale_price {
            active.sale_price = Set(price);
        }
        if let Some(memo) = changes.memo {
            active.memo = Set(memo);
        }

        active
            .update(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Deletes a book and its stock ledger. Books with recorded sales
    /// cannot be deleted.
    pub async fn delete_book(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        self.get_book(id).await?;

        let sales = BookSale::find()
            .filter(book_sale::Column::BookId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if sales > 0 {
            return Err(ServiceError::InvalidOperation(
                "book has recorded sales".to_string(),
            ));
        }

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                BookStockEntry::delete_many()
                    .filter(book_stock_entry::Column::BookId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                Book::delete_by_id(id)
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                Ok(())
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }

    // ---- stock ledger ----------------------------------------------------

    /// Records a stock-in from a supplier.
    pub async fn restock_book(
        &self,
        book_id: Uuid,
        movement: StockMovement,
    ) -> Result<(book_stock_entry::Model, book::Model), ServiceError> {
        if movement.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "restock quantity must be positive".to_string(),
            ));
        }
        let (entry, book) = self.record_movement(book_id, movement).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::BookRestocked {
                book_id,
                quantity: entry.quantity,
                new_stock: book.stock,
            })
            .await
        {
            warn!("failed to publish bookstore event: {}", e);
        }
        Ok((entry, book))
    }

    /// Records a return to the supplier as a negative stock entry.
    pub async fn return_book(
        &self,
        book_id: Uuid,
        mut movement: StockMovement,
    ) -> Result<(book_stock_entry::Model, book::Model), ServiceError> {
        if movement.quantity == 0 {
            return Err(ServiceError::ValidationError(
                "return quantity must be non-zero".to_string(),
            ));
        }
        movement.quantity = -movement.quantity.abs();
        let (entry, book) = self.record_movement(book_id, movement).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::BookReturnedToSupplier {
                book_id,
                quantity: entry.quantity,
                new_stock: book.stock,
            })
            .await
        {
            warn!("failed to publish bookstore event: {}", e);
        }
        Ok((entry, book))
    }

    /// Full movement history for a book, newest first.
    pub async fn stock_history(
        &self,
        book_id: Uuid,
    ) -> Result<Vec<book_stock_entry::Model>, ServiceError> {
        self.get_book(book_id).await?;
        BookStockEntry::find()
            .filter(book_stock_entry::Column::BookId.eq(book_id))
            .order_by_desc(book_stock_entry::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    async fn record_movement(
        &self,
        book_id: Uuid,
        movement: StockMovement,
    ) -> Result<(book_stock_entry::Model, book::Model), ServiceError> {
        let db = self.db_pool.as_ref();

        db.transaction::<_, (book_stock_entry::Model, book::Model), ServiceError>(move |txn| {
            Box::pin(async move {
                let book = Book::find_by_id(book_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Book {} not found", book_id))
                    })?;
                apply_stock_movement(txn, book, movement).await
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }

    // ---- sales -----------------------------------------------------------

    /// Sells books to a student. Stock is re-checked inside the
    /// transaction; overselling fails with `InsufficientStock` and leaves
    /// everything untouched.
    pub async fn sell_book(&self, new: NewSale) -> Result<book_sale::Model, ServiceError> {
        if new.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "sale quantity must be positive".to_string(),
            ));
        }
        let db = self.db_pool.as_ref();

        let sale = db
            .transaction::<_, book_sale::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    // Paid sales skip the balance path, so check the buyer
                    // here rather than relying on apply_balance_delta.
                    find_student(txn, new.student_id).await?;

                    let book = Book::find_by_id(new.book_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Book {} not found", new.book_id))
                        })?;

                    if book.stock < new.quantity {
                        return Err(ServiceError::InsufficientStock(format!(
                            "{} requested, {} in stock",
                            new.quantity, book.stock
                        )));
                    }

                    let unit_price = new.unit_price.unwrap_or(book.sale_price);
                    let total = unit_price * i64::from(new.quantity);

                    let mut active_book: book::ActiveModel = book.clone().into();
                    active_book.stock = Set(book.stock - new.quantity);
                    active_book
                        .update(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    let sale = book_sale::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        student_id: Set(new.student_id),
                        book_id: Set(new.book_id),
                        sale_date: Set(new.sale_date),
                        unit_price: Set(unit_price),
                        quantity: Set(new.quantity),
                        is_paid: Set(new.is_paid),
                        payment_date: Set(new.is_paid.then_some(new.sale_date)),
                        memo: Set(new.memo),
                        created_at: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                    if !new.is_paid {
                        apply_balance_delta(txn, new.student_id, total).await?;
                    }

                    Ok(sale)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if let Err(e) = self
            .event_sender
            .send(Event::BookSold {
                sale_id: sale.id,
                book_id: sale.book_id,
                student_id: sale.student_id,
                quantity: sale.quantity,
            })
            .await
        {
            warn!("failed to publish bookstore event: {}", e);
        }

        Ok(sale)
    }

    pub async fn list_sales_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<book_sale::Model>, ServiceError> {
        BookSale::find()
            .filter(book_sale::Column::StudentId.eq(student_id))
            .order_by_desc(book_sale::Column::SaleDate)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Marks a sale paid and subtracts its total from the student's
    /// balance. Settling an already-paid sale is a no-op.
    pub async fn settle_book_sale(
        &self,
        sale_id: Uuid,
        payment_date: Option<NaiveDate>,
    ) -> Result<book_sale::Model, ServiceError> {
        let payment_date = payment_date.ok_or_else(|| {
            ServiceError::ValidationError("payment date is required".to_string())
        })?;
        let db = self.db_pool.as_ref();

        let settled = db
            .transaction::<_, book_sale::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let sale = BookSale::find_by_id(sale_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Book sale {} not found", sale_id))
                        })?;

                    if sale.is_paid {
                        return Ok(sale);
                    }

                    apply_balance_delta(txn, sale.student_id, -sale.total_price()).await?;

                    let mut active: book_sale::ActiveModel = sale.into();
                    active.is_paid = Set(true);
                    active.payment_date = Set(Some(payment_date));
                    active.update(txn).await.map_err(ServiceError::db_error)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if let Err(e) = self
            .event_sender
            .send(Event::BookSaleSettled {
                sale_id,
                student_id: settled.student_id,
            })
            .await
        {
            warn!("failed to publish bookstore event: {}", e);
        }

        Ok(settled)
    }
}

async fn find_stock_entry<C: ConnectionTrait>(
    db: &C,
    entry_id: Uuid,
) -> Result<book_stock_entry::Model, ServiceError> {
    BookStockEntry::find_by_id(entry_id)
        .one(db)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Stock entry {} not found", entry_id)))
}

/// Appends a stock entry and applies its quantity to the book exactly
/// once. Positive movements also overwrite the book's cost price with the
/// entry's unit cost.
async fn apply_stock_movement<C: ConnectionTrait>(
    db: &C,
    book: book::Model,
    movement: StockMovement,
) -> Result<(book_stock_entry::Model, book::Model), ServiceError> {
    if movement.quantity == 0 {
        return Err(ServiceError::ValidationError(
            "stock movement quantity must be non-zero".to_string(),
        ));
    }

    let total_payment = movement
        .total_payment
        .unwrap_or_else(|| (i64::from(movement.quantity) * movement.unit_cost).abs());

    let entry = book_stock_entry::ActiveModel {
        id: Set(Uuid::new_v4()),
        book_id: Set(book.id),
        supplier_id: Set(movement.supplier_id.or(book.supplier_id)),
        quantity: Set(movement.quantity),
        unit_cost: Set(movement.unit_cost),
        total_payment: Set(total_payment),
        is_paid: Set(movement.is_paid),
        payment_date: Set(movement.payment_date),
        memo: Set(movement.memo),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .map_err(ServiceError::db_error)?;

    let mut active_book: book::ActiveModel = book.clone().into();
    active_book.stock = Set(book.stock + movement.quantity);
    if movement.quantity > 0 {
        active_book.cost_price = Set(movement.unit_cost);
    }
    let updated = active_book.update(db).await.map_err(ServiceError::db_error)?;

    Ok((entry, updated))
}

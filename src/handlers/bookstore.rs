use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::ServiceError,
    handlers::common::{created_response, no_content_response, success_response, validate_input},
    services::bookstore::{BookChanges, NewBook, NewSale, NewSupplier, StockMovement},
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 20))]
    pub isbn: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub supplier_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub list_price: i64,
    #[validate(range(min = 0))]
    pub cost_price: i64,
    #[validate(range(min = 0))]
    pub sale_price: i64,
    #[serde(default)]
    pub initial_stock: i32,
    pub memo: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub author: Option<Option<String>>,
    pub publisher: Option<Option<String>>,
    pub supplier_id: Option<Option<Uuid>>,
    pub list_price: Option<i64>,
    pub sale_price: Option<i64>,
    pub memo: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

#[derive(Debug, Deserialize, Validate)]
pub struct StockMovementRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub unit_cost: Option<i64>,
    pub supplier_id: Option<Uuid>,
    pub total_payment: Option<i64>,
    #[serde(default)]
    pub is_paid: bool,
    pub payment_date: Option<NaiveDate>,
    pub memo: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SellBookRequest {
    pub student_id: Uuid,
    pub book_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub unit_price: Option<i64>,
    pub sale_date: NaiveDate,
    #[serde(default)]
    pub is_paid: bool,
    pub memo: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SettleSaleRequest {
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub registration_number: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_owner: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SettleSupplierEntriesRequest {
    #[validate(length(min = 1))]
    pub entry_ids: Vec<Uuid>,
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelSupplierSettlementRequest {
    #[validate(length(min = 1))]
    pub entry_ids: Vec<Uuid>,
}

// ---- books ----------------------------------------------------------------

async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let book = state
        .services
        .bookstore
        .create_book(NewBook {
            title: payload.title,
            isbn: payload.isbn,
            author: payload.author,
            publisher: payload.publisher,
            supplier_id: payload.supplier_id,
            list_price: payload.list_price,
            cost_price: payload.cost_price,
            sale_price: payload.sale_price,
            initial_stock: payload.initial_stock,
            memo: payload.memo,
        })
        .await?;
    Ok(created_response(book))
}

async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBooksQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (books, total_pages) = state
        .services
        .bookstore
        .list_books(query.search, query.page, Some(query.per_page))
        .await?;
    Ok(success_response(json!({
        "data": books,
        "page": query.page,
        "total_pages": total_pages,
    })))
}

async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let book = state.services.bookstore.get_book(id).await?;
    Ok(success_response(book))
}

async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let book = state
        .services
        .bookstore
        .update_book(
            id,
            BookChanges {
                title: payload.title,
                author: payload.author,
                publisher: payload.publisher,
                supplier_id: payload.supplier_id,
                list_price: payload.list_price,
                sale_price: payload.sale_price,
                memo: payload.memo,
            },
        )
        .await?;
    Ok(success_response(book))
}

async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.bookstore.delete_book(id).await?;
    Ok(no_content_response())
}

async fn restock_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockMovementRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let book = state.services.bookstore.get_book(id).await?;
    let (entry, book) = state
        .services
        .bookstore
        .restock_book(
            id,
            StockMovement {
                quantity: payload.quantity,
                unit_cost: payload.unit_cost.unwrap_or(book.cost_price),
                supplier_id: payload.supplier_id,
                total_payment: payload.total_payment,
                is_paid: payload.is_paid,
                payment_date: payload.payment_date,
                memo: payload.memo,
            },
        )
        .await?;
    Ok(created_response(json!({ "entry": entry, "stock": book.stock })))
}

async fn return_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockMovementRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let book = state.services.bookstore.get_book(id).await?;
    let (entry, book) = state
        .services
        .bookstore
        .return_book(
            id,
            StockMovement {
                quantity: payload.quantity,
                unit_cost: payload.unit_cost.unwrap_or(book.cost_price),
                supplier_id: payload.supplier_id,
                total_payment: payload.total_payment,
                is_paid: payload.is_paid,
                payment_date: payload.payment_date,
                memo: payload.memo,
            },
        )
        .await?;
    Ok(created_response(json!({ "entry": entry, "stock": book.stock })))
}

async fn stock_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let entries = state.services.bookstore.stock_history(id).await?;
    Ok(success_response(entries))
}

// ---- sales ------------------------------------------------------------------

async fn sell_book(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SellBookRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let sale = state
        .services
        .bookstore
        .sell_book(NewSale {
            student_id: payload.student_id,
            book_id: payload.book_id,
            quantity: payload.quantity,
            unit_price: payload.unit_price,
            sale_date: payload.sale_date,
            is_paid: payload.is_paid,
            memo: payload.memo,
        })
        .await?;
    Ok(created_response(sale))
}

async fn settle_sale(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SettleSaleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let sale = state
        .services
        .bookstore
        .settle_book_sale(id, payload.payment_date)
        .await?;
    Ok(success_response(sale))
}

// ---- suppliers ---------------------------------------------------------------

async fn create_supplier(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let supplier = state
        .services
        .bookstore
        .create_supplier(NewSupplier {
            name: payload.name,
            registration_number: payload.registration_number,
            phone: payload.phone,
            address: payload.address,
            bank_name: payload.bank_name,
            account_number: payload.account_number,
            account_owner: payload.account_owner,
        })
        .await?;
    Ok(created_response(supplier))
}

async fn list_suppliers(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    let suppliers = state.services.bookstore.list_suppliers().await?;
    Ok(success_response(suppliers))
}

async fn get_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.services.bookstore.get_supplier(id).await?;
    Ok(success_response(supplier))
}

async fn delete_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.bookstore.delete_supplier(id).await?;
    Ok(no_content_response())
}

async fn supplier_statement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let statement = state.services.bookstore.supplier_statement(id).await?;
    Ok(success_response(statement))
}

async fn settle_supplier_entries(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SettleSupplierEntriesRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let count = state
        .services
        .bookstore
        .settle_supplier_entries(payload.entry_ids, payload.payment_date)
        .await?;
    Ok(success_response(json!({ "settled": count })))
}

async fn cancel_supplier_settlement(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CancelSupplierSettlementRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let count = state
        .services
        .bookstore
        .cancel_supplier_settlement(payload.entry_ids)
        .await?;
    Ok(success_response(json!({ "cancelled": count })))
}

pub fn book_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/:id", get(get_book).put(update_book).delete(delete_book))
        .route("/:id/restock", post(restock_book))
        .route("/:id/return", post(return_book))
        .route("/:id/stock-history", get(stock_history))
}

pub fn sale_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(sell_book))
        .route("/:id/settle", post(settle_sale))
}

pub fn supplier_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route("/:id", get(get_supplier).delete(delete_supplier))
        .route("/:id/statement", get(supplier_statement))
        .route("/settle", post(settle_supplier_entries))
        .route("/cancel-settlement", post(cancel_supplier_settlement))
}

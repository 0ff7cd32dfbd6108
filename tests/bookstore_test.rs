mod common;

use academy_api::{
    errors::ServiceError,
    services::bookstore::{NewSale, NewSupplier, StockMovement},
};
use assert_matches::assert_matches;
use common::{date, seed_book, seed_student, setup};

fn movement(quantity: i32, unit_cost: i64) -> StockMovement {
    StockMovement {
        quantity,
        unit_cost,
        supplier_id: None,
        total_payment: None,
        is_paid: false,
        payment_date: None,
        memo: None,
    }
}

#[tokio::test]
async fn stock_mirrors_the_entry_ledger() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, "Grammar in Use", "9780521189064", 10).await;

    let book = ctx.bookstore.get_book(book_id).await.unwrap();
    assert_eq!(book.stock, 10);
    assert_eq!(book.cost_price, 8_000);

    let (_, book) = ctx
        .bookstore
        .restock_book(book_id, movement(5, 9_000))
        .await
        .unwrap();
    assert_eq!(book.stock, 15);
    // Most recent purchase price wins.
    assert_eq!(book.cost_price, 9_000);

    let (entry, book) = ctx
        .bookstore
        .return_book(book_id, movement(3, 9_000))
        .await
        .unwrap();
    assert_eq!(entry.quantity, -3);
    assert_eq!(book.stock, 12);
    // Negative movements never touch the cost price.
    assert_eq!(book.cost_price, 9_000);

    let history = ctx.bookstore.stock_history(book_id).await.unwrap();
    let ledger_sum: i32 = history.iter().map(|e| e.quantity).sum();
    assert_eq!(ledger_sum, book.stock);
}

#[tokio::test]
async fn cost_price_updates_only_on_positive_quantities() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, "Vocab Master", "9791160000001", 4).await;

    ctx.bookstore
        .return_book(book_id, movement(2, 3_000))
        .await
        .unwrap();
    let book = ctx.bookstore.get_book(book_id).await.unwrap();
    assert_eq!(book.cost_price, 8_000);

    ctx.bookstore
        .restock_book(book_id, movement(1, 7_500))
        .await
        .unwrap();
    let book = ctx.bookstore.get_book(book_id).await.unwrap();
    assert_eq!(book.cost_price, 7_500);
}

#[tokio::test]
async fn total_payment_defaults_to_absolute_value() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, "Readers 1", "9791160000002", 0).await;

    let (entry, _) = ctx
        .bookstore
        .return_book(book_id, movement(4, 2_500))
        .await
        .unwrap();
    assert_eq!(entry.quantity, -4);
    assert_eq!(entry.total_payment, 10_000);

    let (entry, _) = ctx
        .bookstore
        .restock_book(
            book_id,
            StockMovement {
                total_payment: Some(9_999),
                ..movement(4, 2_500)
            },
        )
        .await
        .unwrap();
    assert_eq!(entry.total_payment, 9_999);
}

#[tokio::test]
async fn overselling_fails_and_mutates_nothing() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Bomi").await;
    let book_id = seed_book(&ctx, "Workbook A", "9791160000003", 2).await;

    let err = ctx
        .bookstore
        .sell_book(NewSale {
            student_id,
            book_id,
            quantity: 5,
            unit_price: None,
            sale_date: date(2025, 11, 10),
            is_paid: false,
            memo: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let book = ctx.bookstore.get_book(book_id).await.unwrap();
    assert_eq!(book.stock, 2);
    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 0);
    assert!(ctx
        .bookstore
        .list_sales_for_student(student_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn unpaid_sale_raises_balance_and_settlement_clears_it() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Chul-soo").await;
    let book_id = seed_book(&ctx, "Workbook B", "9791160000004", 10).await;

    let sale = ctx
        .bookstore
        .sell_book(NewSale {
            student_id,
            book_id,
            quantity: 2,
            unit_price: Some(7_000),
            sale_date: date(2025, 11, 10),
            is_paid: false,
            memo: None,
        })
        .await
        .unwrap();
    assert_eq!(sale.total_price(), 14_000);

    let book = ctx.bookstore.get_book(book_id).await.unwrap();
    assert_eq!(book.stock, 8);
    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 14_000);

    ctx.bookstore
        .settle_book_sale(sale.id, Some(date(2025, 11, 20)))
        .await
        .unwrap();
    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 0);

    // Second settlement is a no-op.
    ctx.bookstore
        .settle_book_sale(sale.id, Some(date(2025, 11, 25)))
        .await
        .unwrap();
    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 0);
}

#[tokio::test]
async fn selling_to_unknown_student_fails_even_when_paid() {
    let ctx = setup().await;
    let book_id = seed_book(&ctx, "Workbook F", "9791160000009", 5).await;

    let err = ctx
        .bookstore
        .sell_book(NewSale {
            student_id: uuid::Uuid::new_v4(),
            book_id,
            quantity: 1,
            unit_price: None,
            sale_date: date(2025, 11, 15),
            is_paid: true,
            memo: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // Nothing was persisted.
    let book = ctx.bookstore.get_book(book_id).await.unwrap();
    assert_eq!(book.stock, 5);
}

#[tokio::test]
async fn paid_sale_never_touches_the_balance() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Somin").await;
    let book_id = seed_book(&ctx, "Workbook C", "9791160000005", 3).await;

    let sale = ctx
        .bookstore
        .sell_book(NewSale {
            student_id,
            book_id,
            quantity: 1,
            unit_price: None,
            sale_date: date(2025, 11, 12),
            is_paid: true,
            memo: None,
        })
        .await
        .unwrap();
    // Default unit price comes from the book.
    assert_eq!(sale.unit_price, 10_000);
    assert_eq!(sale.payment_date, Some(date(2025, 11, 12)));

    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 0);
}

#[tokio::test]
async fn balance_breakdown_splits_books_from_tuition() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Haeun").await;
    let class_id = common::seed_class(&ctx, "Essay", 50_000).await;
    let book_id = seed_book(&ctx, "Workbook D", "9791160000006", 5).await;

    ctx.billing
        .charge_tuition(student_id, class_id, date(2025, 4, 1))
        .await
        .unwrap();
    ctx.bookstore
        .sell_book(NewSale {
            student_id,
            book_id,
            quantity: 2,
            unit_price: Some(10_000),
            sale_date: date(2025, 4, 2),
            is_paid: false,
            memo: None,
        })
        .await
        .unwrap();

    let breakdown = ctx.students.balance_breakdown(student_id).await.unwrap();
    assert_eq!(breakdown.unpaid_amount, 70_000);
    assert_eq!(breakdown.unpaid_book_total, 20_000);
    assert_eq!(breakdown.unpaid_tuition_total, 50_000);
}

#[tokio::test]
async fn supplier_settlement_is_orthogonal_to_stock() {
    let ctx = setup().await;
    let supplier = ctx
        .bookstore
        .create_supplier(NewSupplier {
            name: "Hakwon Books Co.".to_string(),
            registration_number: None,
            phone: None,
            address: None,
            bank_name: None,
            account_number: None,
            account_owner: None,
        })
        .await
        .unwrap();
    let book_id = seed_book(&ctx, "Workbook E", "9791160000007", 0).await;

    let (entry, book) = ctx
        .bookstore
        .restock_book(
            book_id,
            StockMovement {
                supplier_id: Some(supplier.id),
                ..movement(6, 4_000)
            },
        )
        .await
        .unwrap();
    assert_eq!(book.stock, 6);
    assert!(!entry.is_paid);

    let statement = ctx.bookstore.supplier_statement(supplier.id).await.unwrap();
    assert_eq!(statement.unpaid_stock_ins.len(), 1);
    assert_eq!(statement.unpaid_total, 24_000);

    let settled = ctx
        .bookstore
        .settle_supplier_entries(vec![entry.id], Some(date(2025, 11, 30)))
        .await
        .unwrap();
    assert_eq!(settled, 1);

    // Stock is unchanged by settlement.
    let book = ctx.bookstore.get_book(book_id).await.unwrap();
    assert_eq!(book.stock, 6);

    let statement = ctx.bookstore.supplier_statement(supplier.id).await.unwrap();
    assert!(statement.unpaid_stock_ins.is_empty());
    assert_eq!(statement.paid_entries.len(), 1);
    assert_eq!(statement.unpaid_total, 0);

    let cancelled = ctx
        .bookstore
        .cancel_supplier_settlement(vec![entry.id])
        .await
        .unwrap();
    assert_eq!(cancelled, 1);
    let statement = ctx.bookstore.supplier_statement(supplier.id).await.unwrap();
    assert_eq!(statement.unpaid_total, 24_000);
}

#[tokio::test]
async fn duplicate_isbn_is_a_conflict() {
    let ctx = setup().await;
    seed_book(&ctx, "Original", "9791160000008", 0).await;

    let err = ctx
        .bookstore
        .create_book(academy_api::services::bookstore::NewBook {
            title: "Copycat".to_string(),
            isbn: "9791160000008".to_string(),
            author: None,
            publisher: None,
            supplier_id: None,
            list_price: 0,
            cost_price: 0,
            sale_price: 0,
            initial_stock: 0,
            memo: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

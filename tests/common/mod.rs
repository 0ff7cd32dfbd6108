#![allow(dead_code)]

use academy_api::{
    db::{self, DbConfig, DbPool},
    entities::student::Gender,
    events::{self, EventSender},
    services::{
        billing::{BillingService, NewClassOffering},
        bookstore::{BookstoreService, NewBook},
        payroll::{NewTeacher, PayrollService},
        students::{NewStudent, StudentService},
    },
};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Test harness: fresh in-memory SQLite with the embedded migrations and
/// every service wired over the same pool.
pub struct TestContext {
    pub db: Arc<DbPool>,
    pub students: StudentService,
    pub billing: BillingService,
    pub bookstore: BookstoreService,
    pub payroll: PayrollService,
    _event_task: tokio::task::JoinHandle<()>,
}

pub async fn setup() -> TestContext {
    // A single connection keeps every query on the same in-memory database.
    let config = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let pool = db::establish_connection_with_config(&config)
        .await
        .expect("failed to create test database");
    db::run_migrations(&pool)
        .await
        .expect("failed to run migrations in tests");

    let db = Arc::new(pool);
    let (event_tx, event_rx) = mpsc::channel(256);
    let event_sender = Arc::new(EventSender::new(event_tx));
    let event_task = tokio::spawn(events::process_events(event_rx));

    TestContext {
        students: StudentService::new(db.clone(), event_sender.clone()),
        billing: BillingService::new(db.clone(), event_sender.clone()),
        bookstore: BookstoreService::new(db.clone(), event_sender.clone()),
        payroll: PayrollService::new(db.clone(), event_sender),
        db,
        _event_task: event_task,
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn seed_student(ctx: &TestContext, name: &str) -> Uuid {
    ctx.students
        .create_student(NewStudent {
            name: name.to_string(),
            school: None,
            grade: "K9".to_string(),
            gender: Gender::Female,
            student_phone: None,
            parent_phone: Some("010-1234-5678".to_string()),
            email: None,
            first_class_date: None,
            memo: None,
        })
        .await
        .expect("seed student")
        .id
}

pub async fn seed_class(ctx: &TestContext, name: &str, monthly_fee: i64) -> Uuid {
    ctx.billing
        .create_class(NewClassOffering {
            name: name.to_string(),
            teacher_id: None,
            monthly_fee,
            schedule: None,
            start_date: None,
            end_date: None,
        })
        .await
        .expect("seed class")
        .id
}

pub async fn seed_book(ctx: &TestContext, title: &str, isbn: &str, initial_stock: i32) -> Uuid {
    ctx.bookstore
        .create_book(NewBook {
            title: title.to_string(),
            isbn: isbn.to_string(),
            author: None,
            publisher: None,
            supplier_id: None,
            list_price: 12_000,
            cost_price: 8_000,
            sale_price: 10_000,
            initial_stock,
            memo: None,
        })
        .await
        .expect("seed book")
        .id
}

pub async fn seed_teacher(
    ctx: &TestContext,
    name: &str,
    hire_date: NaiveDate,
    base_pay: i64,
    extra_pay: i64,
) -> Uuid {
    ctx.payroll
        .create_teacher(NewTeacher {
            name: name.to_string(),
            gender: Gender::Male,
            phone: "010-9876-5432".to_string(),
            email: None,
            hire_date,
            base_pay,
            extra_pay,
            bank_name: "Kookmin".to_string(),
            account_number: "110-222-333444".to_string(),
        })
        .await
        .expect("seed teacher")
        .id
}

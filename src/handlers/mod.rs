use crate::{
    db::DbPool,
    events::EventSender,
    services::{
        billing::BillingService, bookstore::BookstoreService, dashboard::DashboardService,
        payroll::PayrollService, students::StudentService,
    },
};
use std::sync::Arc;

pub mod bookstore;
pub mod classes;
pub mod common;
pub mod dashboard;
pub mod students;
pub mod teachers;

/// All application services, constructed once at startup and shared
/// through `AppState`.
pub struct AppServices {
    pub students: Arc<StudentService>,
    pub billing: Arc<BillingService>,
    pub bookstore: Arc<BookstoreService>,
    pub payroll: Arc<PayrollService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            students: Arc::new(StudentService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            billing: Arc::new(BillingService::new(db_pool.clone(), event_sender.clone())),
            bookstore: Arc::new(BookstoreService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            payroll: Arc::new(PayrollService::new(db_pool.clone(), event_sender)),
            dashboard: Arc::new(DashboardService::new(db_pool)),
        }
    }
}

use crate::{
    db::DbPool,
    entities::{
        book::{self, Entity as Book},
        book_stock_entry::{self, Entity as BookStockEntry},
        student::{self, Entity as Student},
        teacher::{self, Entity as Teacher, TeacherStatus},
    },
    errors::ServiceError,
};
use sea_orm::*;
use std::sync::Arc;

const LOW_STOCK_THRESHOLD: i32 = 5;
const RECENT_ENTRY_COUNT: u64 = 5;

/// At-a-glance numbers for the landing page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardSummary {
    pub student_count: u64,
    pub teacher_count: u64,
    pub total_unpaid: i64,
    pub low_stock_books: Vec<book::Model>,
    pub out_of_stock_count: u64,
    pub recent_stock_entries: Vec<book_stock_entry::Model>,
}

pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    pub async fn summary(&self) -> Result<DashboardSummary, ServiceError> {
        let db = self.db_pool.as_ref();

        let student_count = Student::find()
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        let teacher_count = Teacher::find()
            .filter(teacher::Column::Status.ne(TeacherStatus::Resigned))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        let students = Student::find()
            .filter(student::Column::UnpaidAmount.gt(0))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        let total_unpaid: i64 = students.iter().map(|s| s.unpaid_amount).sum();

        let low_stock_books = Book::find()
            .filter(book::Column::Stock.gt(0))
            .filter(book::Column::Stock.lte(LOW_STOCK_THRESHOLD))
            .order_by_asc(book::Column::Stock)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let out_of_stock_count = Book::find()
            .filter(book::Column::Stock.lte(0))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        let recent_stock_entries = BookStockEntry::find()
            .order_by_desc(book_stock_entry::Column::CreatedAt)
            .limit(RECENT_ENTRY_COUNT)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(DashboardSummary {
            student_count,
            teacher_count,
            total_unpaid,
            low_stock_books,
            out_of_stock_count,
            recent_stock_entries,
        })
    }
}

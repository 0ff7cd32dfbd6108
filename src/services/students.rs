use crate::{
    db::DbPool,
    entities::{
        book_sale::{self, Entity as BookSale},
        enrollment::{self, Entity as Enrollment},
        student::{self, Entity as Student, Gender, StudentStatus},
        tuition_charge::{self, Entity as TuitionCharge},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use sea_orm::{Set, TransactionTrait, *};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const STUDENT_NUMBER_MIN: i64 = 10_000_000;
const STUDENT_NUMBER_MAX: i64 = 99_999_999;
const STUDENT_NUMBER_ATTEMPTS: u32 = 20;

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub school: Option<String>,
    pub grade: String,
    pub gender: Gender,
    pub student_phone: Option<String>,
    pub parent_phone: Option<String>,
    pub email: Option<String>,
    pub first_class_date: Option<NaiveDate>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub school: Option<Option<String>>,
    pub grade: Option<String>,
    pub student_phone: Option<Option<String>>,
    pub parent_phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub first_class_date: Option<Option<NaiveDate>>,
    pub last_class_date: Option<Option<NaiveDate>>,
    pub memo: Option<Option<String>>,
    pub status: Option<StudentStatus>,
}

/// Unpaid balance split into its tuition and bookstore components.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BalanceBreakdown {
    pub unpaid_amount: i64,
    pub unpaid_book_total: i64,
    pub unpaid_tuition_total: i64,
}

pub struct StudentService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl StudentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Registers a student, assigning a fresh random 8-digit number.
    pub async fn create_student(&self, new: NewStudent) -> Result<student::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let student_number = self.generate_student_number(db).await?;

        let model = student::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_number: Set(student_number),
            name: Set(new.name),
            school: Set(new.school),
            grade: Set(new.grade),
            gender: Set(new.gender),
            student_phone: Set(new.student_phone),
            parent_phone: Set(new.parent_phone),
            email: Set(new.email),
            first_class_date: Set(new.first_class_date),
            last_class_date: Set(None),
            memo: Set(new.memo),
            status: Set(StudentStatus::Attending),
            unpaid_amount: Set(0),
            created_at: Set(Utc::now()),
        };

        let created = model.insert(db).await.map_err(ServiceError::db_error)?;

        info!(student_id = %created.id, student_number, "student registered");
        if let Err(e) = self
            .event_sender
            .send(Event::StudentRegistered(created.id))
            .await
        {
            warn!("failed to publish student event: {}", e);
        }

        Ok(created)
    }

    pub async fn get_student(&self, id: Uuid) -> Result<student::Model, ServiceError> {
        Student::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Student {} not found", id)))
    }

    /// Lists students, newest first, optionally filtered by status.
    pub async fn list_students(
        &self,
        status: Option<StudentStatus>,
    ) -> Result<Vec<student::Model>, ServiceError> {
        let mut query = Student::find().order_by_desc(student::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(student::Column::Status.eq(status));
        }
        query
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn update_student(
        &self,
        id: Uuid,
        changes: StudentChanges,
    ) -> Result<student::Model, ServiceError> {
        let existing = self.get_student(id).await?;
        let mut active: student::ActiveModel = existing.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(school) = changes.school {
            active.school = Set(school);
        }
        if let Some(grade) = changes.grade {
            active.grade = Set(grade);
        }
        if let Some(phone) = changes.student_phone {
            active.student_phone = Set(phone);
        }
        if let Some(phone) = changes.parent_phone {
            active.parent_phone = Set(phone);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(date) = changes.first_class_date {
            active.first_class_date = Set(date);
        }
        if let Some(date) = changes.last_class_date {
            active.last_class_date = Set(date);
        }
        if let Some(memo) = changes.memo {
            active.memo = Set(memo);
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }

        let updated = active
            .update(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        if let Err(e) = self.event_sender.send(Event::StudentUpdated(id)).await {
            warn!("failed to publish student event: {}", e);
        }

        Ok(updated)
    }

    /// Removes a student along with their enrollments, tuition charges and
    /// book sales.
    pub async fn delete_student(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        self.get_student(id).await?;

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                Enrollment::delete_many()
                    .filter(enrollment::Column::StudentId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                TuitionCharge::delete_many()
                    .filter(tuition_charge::Column::StudentId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                BookSale::delete_many()
                    .filter(book_sale::Column::StudentId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                Student::delete_by_id(id)
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
        })?;

        info!(student_id = %id, "student deleted");
        if let Err(e) = self.event_sender.send(Event::StudentDeleted(id)).await {
            warn!("failed to publish student event: {}", e);
        }

        Ok(())
    }

    /// Splits the cached balance into unpaid book sales and the tuition
    /// remainder.
    pub async fn balance_breakdown(&self, id: Uuid) -> Result<BalanceBreakdown, ServiceError> {
        let db = self.db_pool.as_ref();
        let student = self.get_student(id).await?;

        let unpaid_sales = BookSale::find()
            .filter(book_sale::Column::StudentId.eq(id))
            .filter(book_sale::Column::IsPaid.eq(false))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let unpaid_book_total: i64 = unpaid_sales.iter().map(|s| s.total_price()).sum();
        let unpaid_tuition_total = (student.unpaid_amount - unpaid_book_total).max(0);

        Ok(BalanceBreakdown {
            unpaid_amount: student.unpaid_amount,
            unpaid_book_total,
            unpaid_tuition_total,
        })
    }

    async fn generate_student_number(&self, db: &DatabaseConnection) -> Result<i64, ServiceError> {
        for _ in 0..STUDENT_NUMBER_ATTEMPTS {
            let candidate = rand::thread_rng().gen_range(STUDENT_NUMBER_MIN..=STUDENT_NUMBER_MAX);
            let taken = Student::find()
                .filter(student::Column::StudentNumber.eq(candidate))
                .count(db)
                .await
                .map_err(ServiceError::db_error)?;
            if taken == 0 {
                return Ok(candidate);
            }
        }
        Err(ServiceError::InternalError(
            "could not allocate a unique student number".to_string(),
        ))
    }
}

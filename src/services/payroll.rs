use crate::{
    db::DbPool,
    entities::{
        payment_record::{self, Entity as PaymentRecord},
        student::Gender,
        teacher::{self, Entity as Teacher, TeacherStatus},
        unavailable_day::{self, Entity as UnavailableDay},
        work_record::{self, Entity as WorkRecord},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{Set, TransactionTrait, *};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewTeacher {
    pub name: String,
    pub gender: Gender,
    pub phone: String,
    pub email: Option<String>,
    pub hire_date: NaiveDate,
    pub base_pay: i64,
    pub extra_pay: i64,
    pub bank_name: String,
    pub account_number: String,
}

#[derive(Debug, Clone, Default)]
pub struct TeacherChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub status: Option<TeacherStatus>,
    pub resign_date: Option<Option<NaiveDate>>,
    pub base_pay: Option<i64>,
    pub extra_pay: Option<i64>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewWorkRecord {
    pub teacher_id: Uuid,
    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub memo: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WorkRow {
    pub teacher_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// One computed payroll line for a teacher in a month.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PayrollRow {
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub work_days: u64,
    pub total_hours: Decimal,
    pub base_pay: i64,
    /// trunc(total_hours * base_pay)
    pub base_salary: i64,
    pub extra_pay: i64,
    pub total_salary: i64,
    pub is_paid: bool,
    pub payment_date: Option<NaiveDate>,
    pub amount_paid: Option<i64>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PayrollReport {
    pub year: i32,
    pub month: u32,
    pub rows: Vec<PayrollRow>,
    pub grand_total: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct WorkSummaryRow {
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub work_days: u64,
    pub total_hours: Decimal,
}

/// Per-teacher row of the yearly payout matrix: one cell per month.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PayoutMatrixRow {
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub monthly: [i64; 12],
    pub total: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PayoutMatrix {
    pub year: i32,
    pub rows: Vec<PayoutMatrixRow>,
    pub month_totals: [i64; 12],
    pub grand_total: i64,
}

pub struct PayrollService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PayrollService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    // ---- teachers --------------------------------------------------------

    pub async fn create_teacher(&self, new: NewTeacher) -> Result<teacher::Model, ServiceError> {
        if new.base_pay < 0 || new.extra_pay < 0 {
            return Err(ServiceError::ValidationError(
                "pay rates must not be negative".to_string(),
            ));
        }

        teacher::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            gender: Set(new.gender),
            phone: Set(new.phone),
            email: Set(new.email),
            status: Set(TeacherStatus::Active),
            hire_date: Set(new.hire_date),
            resign_date: Set(None),
            base_pay: Set(new.base_pay),
            extra_pay: Set(new.extra_pay),
            bank_name: Set(new.bank_name),
            account_number: Set(new.account_number),
            created_at: Set(Utc::now()),
        }
        .insert(self.db_pool.as_ref())
        .await
        .map_err(ServiceError::db_error)
    }

    pub async fn get_teacher(&self, id: Uuid) -> Result<teacher::Model, ServiceError> {
        Teacher::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Teacher {} not found", id)))
    }

    /// Lists teachers; resigned teachers are hidden unless requested.
    pub async fn list_teachers(
        &self,
        include_resigned: bool,
    ) -> Result<Vec<teacher::Model>, ServiceError> {
        let mut query = Teacher::find().order_by_asc(teacher::Column::Name);
        if !include_resigned {
            query = query.filter(teacher::Column::Status.ne(TeacherStatus::Resigned));
        }
        query
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn update_teacher(
        &self,
        id: Uuid,
        changes: TeacherChanges,
    ) -> Result<teacher::Model, ServiceError> {
        let existing = self.get_teacher(id).await?;
        let mut active: teacher::ActiveModel = existing.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }
        if let Some(date) = changes.resign_date {
            active.resign_date = Set(date);
        }
        if let Some(pay) = changes.base_pay {
            if pay < 0 {
                return Err(ServiceError::ValidationError(
                    "pay rates must not be negative".to_string(),
                ));
            }
            active.base_pay = Set(pay);
        }
        if let Some(pay) = changes.extra_pay {
            if pay < 0 {
                return Err(ServiceError::ValidationError(
                    "pay rates must not be negative".to_string(),
                ));
            }
            active.extra_pay = Set(pay);
        }
        if let Some(bank) = changes.bank_name {
            active.bank_name = Set(bank);
        }
        if let Some(account) = changes.account_number {
            active.account_number = Set(account);
        }

        active
            .update(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Removes a teacher along with their work, payment and availability
    /// records.
    pub async fn delete_teacher(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        self.get_teacher(id).await?;

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                WorkRecord::delete_many()
                    .filter(work_record::Column::TeacherId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                PaymentRecord::delete_many()
                    .filter(payment_record::Column::TeacherId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                UnavailableDay::delete_many()
                    .filter(unavailable_day::Column::TeacherId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                Teacher::delete_by_id(id)
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

    // ---- work records ----------------------------------------------------

    pub async fn record_work(
        &self,
        new: NewWorkRecord,
    ) -> Result<work_record::Model, ServiceError> {
        self.get_teacher(new.teacher_id).await?;

        let record = work_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            teacher_id: Set(new.teacher_id),
            work_date: Set(new.work_date),
            start_time: Set(new.start_time),
            end_time: Set(new.end_time),
            memo: Set(new.memo),
            created_at: Set(Utc::now()),
        }
        .insert(self.db_pool.as_ref())
        .await
        .map_err(ServiceError::db_error)?;

        if let Err(e) = self
            .event_sender
            .send(Event::WorkRecorded {
                record_id: record.id,
                teacher_id: record.teacher_id,
            })
            .await
        {
            warn!("failed to publish payroll event: {}", e);
        }

        Ok(record)
    }

    /// Records attendance for several teachers on one date, atomically.
    pub async fn bulk_record_work(
        &self,
        work_date: NaiveDate,
        rows: Vec<WorkRow>,
    ) -> Result<u64, ServiceError> {
        let db = self.db_pool.as_ref();

        db.transaction::<_, u64, ServiceError>(move |txn| {
            Box::pin(async move {
                let mut count = 0u64;
                for row in rows {
                    let exists = Teacher::find_by_id(row.teacher_id)
                        .count(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if exists == 0 {
                        return Err(ServiceError::NotFound(format!(
                            "Teacher {} not found",
                            row.teacher_id
                        )));
                    }

                    work_record::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        teacher_id: Set(row.teacher_id),
                        work_date: Set(work_date),
                        start_time: Set(row.start_time),
                        end_time: Set(row.end_time),
                        memo: Set(None),
                        created_at: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
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

    pub async fn delete_work_record(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = WorkRecord::delete_by_id(id)
            .exec(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Work record {} not found",
                id
            )));
        }
        Ok(())
    }

    pub async fn work_records_for_month(
        &self,
        teacher_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<work_record::Model>, ServiceError> {
        let (from, to) = month_bounds(year, month)?;
        WorkRecord::find()
            .filter(work_record::Column::TeacherId.eq(teacher_id))
            .filter(work_record::Column::WorkDate.gte(from))
            .filter(work_record::Column::WorkDate.lt(to))
            .order_by_asc(work_record::Column::WorkDate)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Work-day and hour totals per teacher for one month.
    pub async fn monthly_work_summary(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<WorkSummaryRow>, ServiceError> {
        let teachers = self.list_teachers(true).await?;
        let mut rows = Vec::new();

        for teacher in teachers {
            let records = self.work_records_for_month(teacher.id, year, month).await?;
            if records.is_empty() {
                continue;
            }
            let total_hours: Decimal = records.iter().map(|r| r.work_hours()).sum();
            rows.push(WorkSummaryRow {
                teacher_id: teacher.id,
                teacher_name: teacher.name,
                work_days: records.len() as u64,
                total_hours,
            });
        }

        Ok(rows)
    }

    // ---- payroll ---------------------------------------------------------

    /// Computes payroll for a month. Teachers hired after the month are
    /// skipped; a row appears only when the teacher worked or carries a
    /// fixed allowance. Settlement state is joined read-only.
    pub async fn compute_payroll(
        &self,
        year: i32,
        month: u32,
    ) -> Result<PayrollReport, ServiceError> {
        month_bounds(year, month)?;
        let teachers = self.list_teachers(true).await?;
        let mut rows = Vec::new();
        let mut grand_total = 0i64;

        for teacher in teachers {
            if !teacher.hired_by_month(year, month) {
                continue;
            }

            let records = self.work_records_for_month(teacher.id, year, month).await?;
            let work_days = records.len() as u64;
            let total_hours: Decimal = records.iter().map(|r| r.work_hours()).sum();

            if work_days == 0 && teacher.extra_pay == 0 {
                continue;
            }

            let base_salary = (total_hours * Decimal::from(teacher.base_pay))
                .trunc()
                .to_i64()
                .ok_or_else(|| {
                    ServiceError::InternalError("base salary out of range".to_string())
                })?;
            let total_salary = base_salary + teacher.extra_pay;

            let payment = PaymentRecord::find()
                .filter(payment_record::Column::TeacherId.eq(teacher.id))
                .filter(payment_record::Column::Year.eq(year))
                .filter(payment_record::Column::Month.eq(month as i32))
                .one(self.db_pool.as_ref())
                .await
                .map_err(ServiceError::db_error)?;

            grand_total += total_salary;
            rows.push(PayrollRow {
                teacher_id: teacher.id,
                teacher_name: teacher.name,
                work_days,
                total_hours,
                base_pay: teacher.base_pay,
                base_salary,
                extra_pay: teacher.extra_pay,
                total_salary,
                is_paid: payment.as_ref().map(|p| p.is_paid).unwrap_or(false),
                payment_date: payment.as_ref().map(|p| p.payment_date),
                amount_paid: payment.map(|p| p.amount_paid),
            });
        }

        Ok(PayrollReport {
            year,
            month,
            rows,
            grand_total,
        })
    }

    /// Settles one teacher's month: inserts or replaces the payment record
    /// for `(teacher, year, month)`.
    pub async fn settle_payroll(
        &self,
        teacher_id: Uuid,
        year: i32,
        month: u32,
        amount_paid: i64,
        payment_date: Option<NaiveDate>,
    ) -> Result<payment_record::Model, ServiceError> {
        let payment_date = payment_date.ok_or_else(|| {
            ServiceError::ValidationError("payment date is required".to_string())
        })?;
        month_bounds(year, month)?;
        self.get_teacher(teacher_id).await?;
        let db = self.db_pool.as_ref();

        let record = db
            .transaction::<_, payment_record::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    upsert_payment(txn, teacher_id, year, month, amount_paid, payment_date).await
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if let Err(e) = self
            .event_sender
            .send(Event::PayrollSettled {
                teacher_id,
                year,
                month: month as i32,
                amount: amount_paid,
            })
            .await
        {
            warn!("failed to publish payroll event: {}", e);
        }

        Ok(record)
    }

    /// Settles every unsettled computed row that has hours or an
    /// allowance. Best-effort per row; returns the success count.
    pub async fn bulk_settle_payroll(
        &self,
        year: i32,
        month: u32,
        payment_date: Option<NaiveDate>,
    ) -> Result<u64, ServiceError> {
        let payment_date = payment_date.ok_or_else(|| {
            ServiceError::ValidationError("payment date is required".to_string())
        })?;
        let report = self.compute_payroll(year, month).await?;
        let mut settled = 0u64;

        for row in report.rows {
            if row.is_paid || (row.total_hours <= Decimal::ZERO && row.extra_pay == 0) {
                continue;
            }
            match self
                .settle_payroll(
                    row.teacher_id,
                    year,
                    month,
                    row.total_salary,
                    Some(payment_date),
                )
                .await
            {
                Ok(_) => settled += 1,
                Err(e) => {
                    error!(
                        teacher_id = %row.teacher_id,
                        year, month, "bulk settlement failed for teacher: {}", e
                    );
                }
            }
        }

        info!(year, month, settled, "bulk payroll settlement finished");
        Ok(settled)
    }

    /// Reverts a settlement by deleting the payment record.
    pub async fn unsettle_payroll(
        &self,
        teacher_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<(), ServiceError> {
        let result = PaymentRecord::delete_many()
            .filter(payment_record::Column::TeacherId.eq(teacher_id))
            .filter(payment_record::Column::Year.eq(year))
            .filter(payment_record::Column::Month.eq(month as i32))
            .exec(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "No payment record for teacher {} in {}-{:02}",
                teacher_id, year, month
            )));
        }

        if let Err(e) = self
            .event_sender
            .send(Event::PayrollUnsettled {
                teacher_id,
                year,
                month: month as i32,
            })
            .await
        {
            warn!("failed to publish payroll event: {}", e);
        }

        Ok(())
    }

    /// Yearly payout matrix from paid payment records. Teachers without
    /// any payment that year are omitted.
    pub async fn payout_matrix(&self, year: i32) -> Result<PayoutMatrix, ServiceError> {
        let db = self.db_pool.as_ref();
        let teachers = self.list_teachers(true).await?;

        let payments = PaymentRecord::find()
            .filter(payment_record::Column::Year.eq(year))
            .filter(payment_record::Column::IsPaid.eq(true))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut rows = Vec::new();
        let mut month_totals = [0i64; 12];
        let mut grand_total = 0i64;

        for teacher in teachers {
            let mut monthly = [0i64; 12];
            let mut total = 0i64;
            for payment in payments.iter().filter(|p| p.teacher_id == teacher.id) {
                let idx = (payment.month - 1).clamp(0, 11) as usize;
                monthly[idx] += payment.amount_paid;
                total += payment.amount_paid;
            }
            if total == 0 {
                continue;
            }
            for (idx, amount) in monthly.iter().enumerate() {
                month_totals[idx] += amount;
            }
            grand_total += total;
            rows.push(PayoutMatrixRow {
                teacher_id: teacher.id,
                teacher_name: teacher.name,
                monthly,
                total,
            });
        }

        Ok(PayoutMatrix {
            year,
            rows,
            month_totals,
            grand_total,
        })
    }

    // ---- availability ----------------------------------------------------

    pub async fn mark_unavailable(
        &self,
        teacher_id: Uuid,
        date: NaiveDate,
        reason: Option<String>,
    ) -> Result<unavailable_day::Model, ServiceError> {
        self.get_teacher(teacher_id).await?;

        unavailable_day::ActiveModel {
            id: Set(Uuid::new_v4()),
            teacher_id: Set(teacher_id),
            date: Set(date),
            reason: Set(reason),
        }
        .insert(self.db_pool.as_ref())
        .await
        .map_err(ServiceError::db_error)
    }

    pub async fn delete_unavailable(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = UnavailableDay::delete_by_id(id)
            .exec(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Unavailable day {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Teachers marked unavailable on a date.
    pub async fn unavailable_teacher_ids(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Uuid>, ServiceError> {
        let days = UnavailableDay::find()
            .filter(unavailable_day::Column::Date.eq(date))
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        Ok(days.into_iter().map(|d| d.teacher_id).collect())
    }
}

/// Validates a (year, month) pair and returns [first of month, first of
/// next month).
fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ServiceError> {
    let from = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        ServiceError::ValidationError(format!("invalid year-month {}-{}", year, month))
    })?;
    let to = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| {
        ServiceError::ValidationError(format!("invalid year-month {}-{}", year, month))
    })?;
    Ok((from, to))
}

async fn upsert_payment<C: ConnectionTrait>(
    db: &C,
    teacher_id: Uuid,
    year: i32,
    month: u32,
    amount_paid: i64,
    payment_date: NaiveDate,
) -> Result<payment_record::Model, ServiceError> {
    let existing = PaymentRecord::find()
        .filter(payment_record::Column::TeacherId.eq(teacher_id))
        .filter(payment_record::Column::Year.eq(year))
        .filter(payment_record::Column::Month.eq(month as i32))
        .one(db)
        .await
        .map_err(ServiceError::db_error)?;

    match existing {
        Some(record) => {
            let mut active: payment_record::ActiveModel = record.into();
            active.amount_paid = Set(amount_paid);
            active.payment_date = Set(payment_date);
            active.is_paid = Set(true);
            active.update(db).await.map_err(ServiceError::db_error)
        }
        None => payment_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            teacher_id: Set(teacher_id),
            year: Set(year),
            month: Set(month as i32),
            amount_paid: Set(amount_paid),
            payment_date: Set(payment_date),
            is_paid: Set(true),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_rejects_invalid_months() {
        assert!(month_bounds(2025, 13).is_err());
        assert!(month_bounds(2025, 0).is_err());
    }

    #[test]
    fn month_bounds_wraps_december() {
        let (from, to) = month_bounds(2025, 12).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }
}

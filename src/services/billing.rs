use crate::{
    db::DbPool,
    entities::{
        class_offering::{self, Entity as ClassOffering},
        enrollment::{self, Entity as Enrollment},
        student::{self, Entity as Student},
        tuition_charge::{self, Entity as TuitionCharge},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::proration::prorate,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{Set, TransactionTrait, *};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewClassOffering {
    pub name: String,
    pub teacher_id: Option<Uuid>,
    pub monthly_fee: i64,
    pub schedule: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassChanges {
    pub name: Option<String>,
    pub teacher_id: Option<Option<Uuid>>,
    pub monthly_fee: Option<i64>,
    pub schedule: Option<Option<String>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
}

/// Outcome of reconciling a class roster against a submitted student set.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RosterUpdate {
    pub added: u64,
    pub removed: u64,
    /// Sum of unpaid charge amounts deleted for removed students
    pub refunded: i64,
}

pub struct BillingService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl BillingService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    // ---- class offerings -------------------------------------------------

    pub async fn create_class(
        &self,
        new: NewClassOffering,
    ) -> Result<class_offering::Model, ServiceError> {
        if new.monthly_fee < 0 {
            return Err(ServiceError::ValidationError(
                "monthly fee must not be negative".to_string(),
            ));
        }

        let model = class_offering::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            teacher_id: Set(new.teacher_id),
            monthly_fee: Set(new.monthly_fee),
            schedule: Set(new.schedule),
            start_date: Set(new.start_date),
            end_date: Set(new.end_date),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        };

        model
            .insert(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn get_class(&self, id: Uuid) -> Result<class_offering::Model, ServiceError> {
        ClassOffering::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Class {} not found", id)))
    }

    pub async fn list_classes(
        &self,
        only_active: bool,
    ) -> Result<Vec<class_offering::Model>, ServiceError> {
        let mut query = ClassOffering::find().order_by_desc(class_offering::Column::CreatedAt);
        if only_active {
            query = query.filter(class_offering::Column::IsActive.eq(true));
        }
        query
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn update_class(
        &self,
        id: Uuid,
        changes: ClassChanges,
    ) -> Result<class_offering::Model, ServiceError> {
        let existing = self.get_class(id).await?;
        let mut active: class_offering::ActiveModel = existing.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(teacher_id) = changes.teacher_id {
            active.teacher_id = Set(teacher_id);
        }
        if let Some(fee) = changes.monthly_fee {
            if fee < 0 {
                return Err(ServiceError::ValidationError(
                    "monthly fee must not be negative".to_string(),
                ));
            }
            active.monthly_fee = Set(fee);
        }
        if let Some(schedule) = changes.schedule {
            active.schedule = Set(schedule);
        }
        if let Some(date) = changes.start_date {
            active.start_date = Set(date);
        }
        if let Some(date) = changes.end_date {
            active.end_date = Set(date);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }

        active
            .update(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Deletes a class. Every enrolled student's unpaid charges for the
    /// class are removed with the matching balance decrement first.
    pub async fn delete_class(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        self.get_class(id).await?;

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                let enrollments = Enrollment::find()
                    .filter(enrollment::Column::ClassId.eq(id))
                    .all(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                for enrollment in &enrollments {
                    delete_unpaid_charges(txn, enrollment.student_id, id).await?;
                }

                Enrollment::delete_many()
                    .filter(enrollment::Column::ClassId.eq(id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                ClassOffering::delete_by_id(id)
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

    // ---- enrollment ------------------------------------------------------

    pub async fn enroll(
        &self,
        student_id: Uuid,
        class_id: Uuid,
    ) -> Result<enrollment::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        self.get_class(class_id).await?;
        find_student(db, student_id).await?;

        let existing = Enrollment::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::ClassId.eq(class_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Student {} is already enrolled in class {}",
                student_id, class_id
            )));
        }

        enrollment::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            class_id: Set(class_id),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)
    }

    /// Drops a student from a class. Their unpaid charges for the class are
    /// deleted and subtracted from the balance. Returns the refunded sum.
    pub async fn drop_enrollment(
        &self,
        student_id: Uuid,
        class_id: Uuid,
    ) -> Result<i64, ServiceError> {
        let db = self.db_pool.as_ref();

        let enrollment = Enrollment::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::ClassId.eq(class_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Student {} is not enrolled in class {}",
                    student_id, class_id
                ))
            })?;

        let refunded = db
            .transaction::<_, i64, ServiceError>(move |txn| {
                Box::pin(async move {
                    let refunded = delete_unpaid_charges(txn, student_id, class_id).await?;
                    Enrollment::delete_by_id(enrollment.id)
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    Ok(refunded)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(%student_id, %class_id, refunded, "enrollment dropped");
        Ok(refunded)
    }

    /// Reconciles a class roster against the submitted student set in one
    /// transaction. Added students are enrolled and charged a prorated fee
    /// from `reference_date`; removed students are dropped with their
    /// unpaid charges refunded.
    pub async fn update_roster(
        &self,
        class_id: Uuid,
        student_ids: Vec<Uuid>,
        reference_date: NaiveDate,
    ) -> Result<RosterUpdate, ServiceError> {
        let db = self.db_pool.as_ref();
        let class = self.get_class(class_id).await?;

        let result = db
            .transaction::<_, RosterUpdate, ServiceError>(move |txn| {
                Box::pin(async move {
                    let current = Enrollment::find()
                        .filter(enrollment::Column::ClassId.eq(class_id))
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    let current_ids: Vec<Uuid> =
                        current.iter().map(|e| e.student_id).collect();

                    let mut added = 0u64;
                    let mut removed = 0u64;
                    let mut refunded = 0i64;

                    for enrollment in &current {
                        if !student_ids.contains(&enrollment.student_id) {
                            refunded +=
                                delete_unpaid_charges(txn, enrollment.student_id, class_id)
                                    .await?;
                            Enrollment::delete_by_id(enrollment.id)
                                .exec(txn)
                                .await
                                .map_err(ServiceError::db_error)?;
                            removed += 1;
                        }
                    }

                    for student_id in &student_ids {
                        if current_ids.contains(student_id) {
                            continue;
                        }
                        find_student(txn, *student_id).await?;
                        enrollment::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            student_id: Set(*student_id),
                            class_id: Set(class_id),
                            created_at: Set(Utc::now()),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                        create_charge(txn, *student_id, &class, reference_date, true).await?;
                        added += 1;
                    }

                    Ok(RosterUpdate {
                        added,
                        removed,
                        refunded,
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            %class_id,
            added = result.added,
            removed = result.removed,
            refunded = result.refunded,
            "roster updated"
        );
        Ok(result)
    }

    // ---- tuition charges -------------------------------------------------

    /// Issues a prorated tuition charge for a student in a class.
    pub async fn charge_tuition(
        &self,
        student_id: Uuid,
        class_id: Uuid,
        reference_date: NaiveDate,
    ) -> Result<tuition_charge::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let class = self.get_class(class_id).await?;

        let charge = db
            .transaction::<_, tuition_charge::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    find_student(txn, student_id).await?;
                    create_charge(txn, student_id, &class, reference_date, true).await
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if let Err(e) = self
            .event_sender
            .send(Event::TuitionCharged {
                charge_id: charge.id,
                student_id,
                amount: charge.amount,
            })
            .await
        {
            warn!("failed to publish billing event: {}", e);
        }

        Ok(charge)
    }

    pub async fn get_charge(&self, id: Uuid) -> Result<tuition_charge::Model, ServiceError> {
        TuitionCharge::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Tuition charge {} not found", id)))
    }

    pub async fn list_charges_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<tuition_charge::Model>, ServiceError> {
        TuitionCharge::find()
            .filter(tuition_charge::Column::StudentId.eq(student_id))
            .order_by_desc(tuition_charge::Column::ChargeDate)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Marks a charge paid and subtracts it from the student's balance.
    /// Settling an already-paid charge is a no-op.
    pub async fn settle_tuition(
        &self,
        charge_id: Uuid,
        payment_date: Option<NaiveDate>,
    ) -> Result<tuition_charge::Model, ServiceError> {
        let payment_date = payment_date.ok_or_else(|| {
            ServiceError::ValidationError("payment date is required".to_string())
        })?;
        let db = self.db_pool.as_ref();

        let settled = db
            .transaction::<_, tuition_charge::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let charge = TuitionCharge::find_by_id(charge_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Tuition charge {} not found",
                                charge_id
                            ))
                        })?;

                    if charge.is_paid {
                        return Ok(charge);
                    }

                    apply_balance_delta(txn, charge.student_id, -charge.amount).await?;

                    let mut active: tuition_charge::ActiveModel = charge.into();
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
            .send(Event::TuitionSettled {
                charge_id,
                student_id: settled.student_id,
            })
            .await
        {
            warn!("failed to publish billing event: {}", e);
        }

        Ok(settled)
    }

    /// Reverts settlement on the given charges: marks them unpaid, clears
    /// payment dates and restores the balances. Charges that are not paid
    /// are skipped. Returns the number reverted.
    pub async fn cancel_settlement(&self, charge_ids: Vec<Uuid>) -> Result<u64, ServiceError> {
        let db = self.db_pool.as_ref();

        let count = db
            .transaction::<_, u64, ServiceError>(move |txn| {
                Box::pin(async move {
                    let mut count = 0u64;
                    for charge_id in charge_ids {
                        let charge = TuitionCharge::find_by_id(charge_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Tuition charge {} not found",
                                    charge_id
                                ))
                            })?;

                        if !charge.is_paid {
                            continue;
                        }

                        apply_balance_delta(txn, charge.student_id, charge.amount).await?;

                        let mut active: tuition_charge::ActiveModel = charge.into();
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
            })?;

        info!(count, "tuition settlements cancelled");
        if let Err(e) = self
            .event_sender
            .send(Event::TuitionSettlementCancelled { reverted: count })
            .await
        {
            warn!("failed to publish billing event: {}", e);
        }
        Ok(count)
    }

    /// Deletes an unpaid charge and subtracts it from the balance. Paid
    /// charges cannot be deleted; cancel the settlement first.
    pub async fn delete_charge(&self, charge_id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();

        let (student_id, refunded) = db
            .transaction::<_, (Uuid, i64), ServiceError>(move |txn| {
                Box::pin(async move {
                    let charge = TuitionCharge::find_by_id(charge_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Tuition charge {} not found",
                                charge_id
                            ))
                        })?;

                    if charge.is_paid {
                        return Err(ServiceError::InvalidOperation(
                            "paid charges cannot be deleted".to_string(),
                        ));
                    }

                    apply_balance_delta(txn, charge.student_id, -charge.amount).await?;
                    TuitionCharge::delete_by_id(charge_id)
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    Ok((charge.student_id, charge.amount))
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if let Err(e) = self
            .event_sender
            .send(Event::TuitionChargeDeleted {
                charge_id,
                student_id,
                refunded,
            })
            .await
        {
            warn!("failed to publish billing event: {}", e);
        }

        Ok(())
    }

    /// Charges the full monthly fee to every enrolled student of every
    /// active class that has no charge for the reference billing month.
    /// One transaction; any failure rolls the whole batch back.
    pub async fn batch_charge(&self, reference_date: NaiveDate) -> Result<u64, ServiceError> {
        let db = self.db_pool.as_ref();
        let billing_month = reference_date.format("%Y-%m").to_string();

        let month = billing_month.clone();
        let count = db
            .transaction::<_, u64, ServiceError>(move |txn| {
                Box::pin(async move {
                    // Read the class list under the transaction so a class
                    // deactivated meanwhile is not billed.
                    let classes = ClassOffering::find()
                        .filter(class_offering::Column::IsActive.eq(true))
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    let mut count = 0u64;
                    for class in &classes {
                        let enrollments = Enrollment::find()
                            .filter(enrollment::Column::ClassId.eq(class.id))
                            .all(txn)
                            .await
                            .map_err(ServiceError::db_error)?;

                        for enrollment in enrollments {
                            let already_charged = TuitionCharge::find()
                                .filter(
                                    tuition_charge::Column::StudentId.eq(enrollment.student_id),
                                )
                                .filter(tuition_charge::Column::ClassId.eq(class.id))
                                .filter(tuition_charge::Column::BillingMonth.eq(month.clone()))
                                .count(txn)
                                .await
                                .map_err(ServiceError::db_error)?;
                            if already_charged > 0 {
                                continue;
                            }

                            create_charge(txn, enrollment.student_id, class, reference_date, false)
                                .await?;
                            count += 1;
                        }
                    }
                    Ok(count)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(%billing_month, count, "monthly batch billing completed");
        if let Err(e) = self
            .event_sender
            .send(Event::MonthlyBillingCompleted {
                billing_month,
                charges_created: count,
            })
            .await
        {
            warn!("failed to publish billing event: {}", e);
        }
        Ok(count)
    }
}

pub(crate) async fn find_student<C: ConnectionTrait>(
    db: &C,
    student_id: Uuid,
) -> Result<student::Model, ServiceError> {
    Student::find_by_id(student_id)
        .one(db)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Student {} not found", student_id)))
}

/// Applies a signed delta to a student's cached balance. Callers must run
/// inside the transaction that writes the matching ledger entry.
pub(crate) async fn apply_balance_delta<C: ConnectionTrait>(
    db: &C,
    student_id: Uuid,
    delta: i64,
) -> Result<(), ServiceError> {
    let student = find_student(db, student_id).await?;
    let mut active: student::ActiveModel = student.clone().into();
    active.unpaid_amount = Set(student.unpaid_amount + delta);
    active.update(db).await.map_err(ServiceError::db_error)?;
    Ok(())
}

/// Inserts an unpaid tuition charge and increments the student balance.
/// `prorated` selects the prorated amount; otherwise the full monthly fee
/// is charged (monthly batch billing).
async fn create_charge<C: ConnectionTrait>(
    db: &C,
    student_id: Uuid,
    class: &class_offering::Model,
    reference_date: NaiveDate,
    prorated: bool,
) -> Result<tuition_charge::Model, ServiceError> {
    let (amount, memo) = if prorated {
        let p = prorate(class.monthly_fee, reference_date);
        (p.amount, Some(p.label))
    } else {
        (class.monthly_fee, None)
    };

    let charge = tuition_charge::ActiveModel {
        id: Set(Uuid::new_v4()),
        student_id: Set(student_id),
        class_id: Set(class.id),
        charge_date: Set(reference_date),
        amount: Set(amount),
        billing_month: Set(reference_date.format("%Y-%m").to_string()),
        memo: Set(memo),
        is_paid: Set(false),
        payment_date: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .map_err(ServiceError::db_error)?;

    apply_balance_delta(db, student_id, amount).await?;
    Ok(charge)
}

/// Deletes a student's unpaid charges for one class, decrementing the
/// balance by their sum. Paid charges are untouched. Returns the sum.
async fn delete_unpaid_charges<C: ConnectionTrait>(
    db: &C,
    student_id: Uuid,
    class_id: Uuid,
) -> Result<i64, ServiceError> {
    let unpaid = TuitionCharge::find()
        .filter(tuition_charge::Column::StudentId.eq(student_id))
        .filter(tuition_charge::Column::ClassId.eq(class_id))
        .filter(tuition_charge::Column::IsPaid.eq(false))
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;

    let mut refunded = 0i64;
    for charge in unpaid {
        refunded += charge.amount;
        TuitionCharge::delete_by_id(charge.id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;
    }

    if refunded != 0 {
        apply_balance_delta(db, student_id, -refunded).await?;
    }
    Ok(refunded)
}

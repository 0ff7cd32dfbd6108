mod common;

use academy_api::{
    entities::tuition_charge::{self, Entity as TuitionCharge},
    errors::ServiceError,
};
use assert_matches::assert_matches;
use common::{date, seed_class, seed_student, setup};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[tokio::test]
async fn full_month_charge_and_settlement_reconcile_balance() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Yuna").await;
    let class_id = seed_class(&ctx, "Algebra II", 90_000).await;

    let charge = ctx
        .billing
        .charge_tuition(student_id, class_id, date(2025, 11, 1))
        .await
        .unwrap();
    assert_eq!(charge.amount, 90_000);
    assert!(!charge.is_paid);
    assert_eq!(charge.billing_month, "2025-11");

    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 90_000);

    let settled = ctx
        .billing
        .settle_tuition(charge.id, Some(date(2025, 11, 5)))
        .await
        .unwrap();
    assert!(settled.is_paid);
    assert_eq!(settled.payment_date, Some(date(2025, 11, 5)));

    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 0);
}

#[tokio::test]
async fn mid_month_enrollment_charges_prorated_amount() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Minjun").await;
    let class_id = seed_class(&ctx, "Physics", 90_000).await;

    // Nov 16: 15 of 30 days remain
    let charge = ctx
        .billing
        .charge_tuition(student_id, class_id, date(2025, 11, 16))
        .await
        .unwrap();
    assert_eq!(charge.amount, 45_000);

    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 45_000);
}

#[tokio::test]
async fn double_settlement_changes_balance_once() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Seo-yeon").await;
    let class_id = seed_class(&ctx, "Chemistry", 60_000).await;

    let charge = ctx
        .billing
        .charge_tuition(student_id, class_id, date(2025, 3, 1))
        .await
        .unwrap();

    ctx.billing
        .settle_tuition(charge.id, Some(date(2025, 3, 10)))
        .await
        .unwrap();
    let again = ctx
        .billing
        .settle_tuition(charge.id, Some(date(2025, 3, 20)))
        .await
        .unwrap();

    // First settlement wins; the repeat is a no-op.
    assert_eq!(again.payment_date, Some(date(2025, 3, 10)));
    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 0);
}

#[tokio::test]
async fn settlement_without_payment_date_is_rejected() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Jiho").await;
    let class_id = seed_class(&ctx, "Biology", 50_000).await;

    let charge = ctx
        .billing
        .charge_tuition(student_id, class_id, date(2025, 5, 1))
        .await
        .unwrap();

    let err = ctx.billing.settle_tuition(charge.id, None).await.unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 50_000);
}

#[tokio::test]
async fn cancelling_settlement_restores_balance_and_clears_date() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Hana").await;
    let class_id = seed_class(&ctx, "English", 80_000).await;

    let charge = ctx
        .billing
        .charge_tuition(student_id, class_id, date(2025, 7, 1))
        .await
        .unwrap();
    ctx.billing
        .settle_tuition(charge.id, Some(date(2025, 7, 3)))
        .await
        .unwrap();

    let cancelled = ctx.billing.cancel_settlement(vec![charge.id]).await.unwrap();
    assert_eq!(cancelled, 1);

    let charge = ctx.billing.get_charge(charge.id).await.unwrap();
    assert!(!charge.is_paid);
    assert_eq!(charge.payment_date, None);

    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 80_000);

    // Unpaid charges are skipped on a second pass.
    let cancelled = ctx.billing.cancel_settlement(vec![charge.id]).await.unwrap();
    assert_eq!(cancelled, 0);
}

#[tokio::test]
async fn dropping_enrollment_refunds_only_unpaid_charges() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Taeyang").await;
    let class_id = seed_class(&ctx, "History", 70_000).await;

    ctx.billing.enroll(student_id, class_id).await.unwrap();
    let paid = ctx
        .billing
        .charge_tuition(student_id, class_id, date(2025, 9, 1))
        .await
        .unwrap();
    ctx.billing
        .settle_tuition(paid.id, Some(date(2025, 9, 2)))
        .await
        .unwrap();
    let unpaid = ctx
        .billing
        .charge_tuition(student_id, class_id, date(2025, 10, 1))
        .await
        .unwrap();

    let refunded = ctx
        .billing
        .drop_enrollment(student_id, class_id)
        .await
        .unwrap();
    assert_eq!(refunded, unpaid.amount);

    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 0);

    // The settled charge survives as history.
    assert!(ctx.billing.get_charge(paid.id).await.is_ok());
    assert_matches!(
        ctx.billing.get_charge(unpaid.id).await.unwrap_err(),
        ServiceError::NotFound(_)
    );
}

#[tokio::test]
async fn roster_update_adds_and_removes_in_one_pass() {
    let ctx = setup().await;
    let staying = seed_student(&ctx, "Stay").await;
    let leaving = seed_student(&ctx, "Leave").await;
    let joining = seed_student(&ctx, "Join").await;
    let class_id = seed_class(&ctx, "Calculus", 90_000).await;

    ctx.billing.enroll(staying, class_id).await.unwrap();
    ctx.billing.enroll(leaving, class_id).await.unwrap();
    ctx.billing
        .charge_tuition(leaving, class_id, date(2025, 11, 1))
        .await
        .unwrap();

    let result = ctx
        .billing
        .update_roster(class_id, vec![staying, joining], date(2025, 11, 16))
        .await
        .unwrap();
    assert_eq!(result.added, 1);
    assert_eq!(result.removed, 1);
    assert_eq!(result.refunded, 90_000);

    let left = ctx.students.get_student(leaving).await.unwrap();
    assert_eq!(left.unpaid_amount, 0);

    // Mid-month join is prorated: 15/30 days of 90000.
    let joined = ctx.students.get_student(joining).await.unwrap();
    assert_eq!(joined.unpaid_amount, 45_000);
}

#[tokio::test]
async fn batch_charge_skips_already_billed_months() {
    let ctx = setup().await;
    let a = seed_student(&ctx, "A").await;
    let b = seed_student(&ctx, "B").await;
    let class_id = seed_class(&ctx, "Writing", 100_000).await;

    ctx.billing.enroll(a, class_id).await.unwrap();
    ctx.billing.enroll(b, class_id).await.unwrap();
    // B already carries a November charge.
    ctx.billing
        .charge_tuition(b, class_id, date(2025, 11, 20))
        .await
        .unwrap();

    let charged = ctx.billing.batch_charge(date(2025, 11, 1)).await.unwrap();
    assert_eq!(charged, 1);

    // Batch billing always charges the full fee.
    let student_a = ctx.students.get_student(a).await.unwrap();
    assert_eq!(student_a.unpaid_amount, 100_000);

    let repeat = ctx.billing.batch_charge(date(2025, 11, 1)).await.unwrap();
    assert_eq!(repeat, 0);

    let total = TuitionCharge::find()
        .filter(tuition_charge::Column::ClassId.eq(class_id))
        .count(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn batch_charge_skips_deactivated_classes() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Eun").await;
    let class_id = seed_class(&ctx, "Debate", 60_000).await;
    ctx.billing.enroll(student_id, class_id).await.unwrap();

    ctx.billing
        .update_class(
            class_id,
            academy_api::services::billing::ClassChanges {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let charged = ctx.billing.batch_charge(date(2025, 11, 1)).await.unwrap();
    assert_eq!(charged, 0);

    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 0);
}

#[tokio::test]
async fn deleting_paid_charge_is_rejected() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Dara").await;
    let class_id = seed_class(&ctx, "Music", 40_000).await;

    let charge = ctx
        .billing
        .charge_tuition(student_id, class_id, date(2025, 6, 1))
        .await
        .unwrap();
    ctx.billing
        .settle_tuition(charge.id, Some(date(2025, 6, 2)))
        .await
        .unwrap();

    let err = ctx.billing.delete_charge(charge.id).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));

    // Unpaid charges can be deleted and refund the balance.
    let charge = ctx
        .billing
        .charge_tuition(student_id, class_id, date(2025, 7, 1))
        .await
        .unwrap();
    ctx.billing.delete_charge(charge.id).await.unwrap();
    let student = ctx.students.get_student(student_id).await.unwrap();
    assert_eq!(student.unpaid_amount, 0);
}

#[tokio::test]
async fn duplicate_enrollment_is_a_conflict() {
    let ctx = setup().await;
    let student_id = seed_student(&ctx, "Nari").await;
    let class_id = seed_class(&ctx, "Art", 30_000).await;

    ctx.billing.enroll(student_id, class_id).await.unwrap();
    let err = ctx.billing.enroll(student_id, class_id).await.unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

mod common;

use academy_api::{
    errors::ServiceError,
    services::payroll::{NewWorkRecord, WorkRow},
};
use assert_matches::assert_matches;
use chrono::NaiveTime;
use common::{date, seed_teacher, setup};
use rust_decimal::Decimal;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn payroll_sums_hours_and_adds_allowance() {
    let ctx = setup().await;
    let teacher_id = seed_teacher(&ctx, "Kim", date(2025, 1, 2), 10_000, 5_000).await;

    // 2h on the 1st, 0.5h on the 2nd.
    for (day, start, end) in [(1, time(18, 0), time(20, 0)), (2, time(19, 0), time(19, 30))] {
        ctx.payroll
            .record_work(NewWorkRecord {
                teacher_id,
                work_date: date(2025, 7, day),
                start_time: start,
                end_time: end,
                memo: None,
            })
            .await
            .unwrap();
    }

    let report = ctx.payroll.compute_payroll(2025, 7).await.unwrap();
    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert_eq!(row.work_days, 2);
    assert_eq!(row.total_hours, Decimal::new(25, 1));
    assert_eq!(row.base_salary, 25_000);
    assert_eq!(row.total_salary, 30_000);
    assert!(!row.is_paid);
    assert_eq!(report.grand_total, 30_000);
}

#[tokio::test]
async fn teachers_hired_after_the_month_are_skipped() {
    let ctx = setup().await;
    // Hired in August; July payroll must not list them even with an allowance.
    seed_teacher(&ctx, "Lee", date(2025, 8, 15), 12_000, 50_000).await;

    let report = ctx.payroll.compute_payroll(2025, 7).await.unwrap();
    assert!(report.rows.is_empty());

    let august = ctx.payroll.compute_payroll(2025, 8).await.unwrap();
    assert_eq!(august.rows.len(), 1);
}

#[tokio::test]
async fn row_requires_work_or_allowance() {
    let ctx = setup().await;
    seed_teacher(&ctx, "NoWorkNoExtra", date(2025, 1, 1), 10_000, 0).await;
    seed_teacher(&ctx, "ExtraOnly", date(2025, 1, 1), 10_000, 30_000).await;

    let report = ctx.payroll.compute_payroll(2025, 6).await.unwrap();
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].teacher_name, "ExtraOnly");
    assert_eq!(report.rows[0].total_salary, 30_000);
}

#[tokio::test]
async fn overnight_shifts_wrap_past_midnight() {
    let ctx = setup().await;
    let teacher_id = seed_teacher(&ctx, "Night Owl", date(2025, 1, 1), 10_000, 0).await;

    ctx.payroll
        .record_work(NewWorkRecord {
            teacher_id,
            work_date: date(2025, 7, 4),
            start_time: time(22, 0),
            end_time: time(2, 0),
            memo: None,
        })
        .await
        .unwrap();

    let report = ctx.payroll.compute_payroll(2025, 7).await.unwrap();
    assert_eq!(report.rows[0].total_hours, Decimal::from(4));
    assert_eq!(report.rows[0].base_salary, 40_000);
}

#[tokio::test]
async fn settlement_upserts_on_teacher_and_month() {
    let ctx = setup().await;
    let teacher_id = seed_teacher(&ctx, "Park", date(2025, 1, 1), 10_000, 0).await;

    let first = ctx
        .payroll
        .settle_payroll(teacher_id, 2025, 7, 100_000, Some(date(2025, 8, 1)))
        .await
        .unwrap();
    let second = ctx
        .payroll
        .settle_payroll(teacher_id, 2025, 7, 120_000, Some(date(2025, 8, 5)))
        .await
        .unwrap();

    // Same row, replaced amount.
    assert_eq!(first.id, second.id);
    assert_eq!(second.amount_paid, 120_000);
    assert_eq!(second.payment_date, date(2025, 8, 5));
}

#[tokio::test]
async fn bulk_settlement_skips_settled_and_empty_rows() {
    let ctx = setup().await;
    let worked = seed_teacher(&ctx, "Worked", date(2025, 1, 1), 10_000, 0).await;
    let already_paid = seed_teacher(&ctx, "Paid", date(2025, 1, 1), 10_000, 0).await;
    seed_teacher(&ctx, "Idle", date(2025, 1, 1), 10_000, 0).await;

    let rows = vec![
        WorkRow {
            teacher_id: worked,
            start_time: time(9, 0),
            end_time: time(12, 0),
        },
        WorkRow {
            teacher_id: already_paid,
            start_time: time(13, 0),
            end_time: time(15, 0),
        },
    ];
    ctx.payroll
        .bulk_record_work(date(2025, 7, 7), rows)
        .await
        .unwrap();
    ctx.payroll
        .settle_payroll(already_paid, 2025, 7, 20_000, Some(date(2025, 8, 1)))
        .await
        .unwrap();

    let settled = ctx
        .payroll
        .bulk_settle_payroll(2025, 7, Some(date(2025, 8, 1)))
        .await
        .unwrap();
    assert_eq!(settled, 1);

    // Everything eligible is now settled; a rerun settles nothing.
    let rerun = ctx
        .payroll
        .bulk_settle_payroll(2025, 7, Some(date(2025, 8, 2)))
        .await
        .unwrap();
    assert_eq!(rerun, 0);
}

#[tokio::test]
async fn unsettle_deletes_the_record_once() {
    let ctx = setup().await;
    let teacher_id = seed_teacher(&ctx, "Choi", date(2025, 1, 1), 10_000, 0).await;

    ctx.payroll
        .settle_payroll(teacher_id, 2025, 7, 90_000, Some(date(2025, 8, 1)))
        .await
        .unwrap();
    ctx.payroll.unsettle_payroll(teacher_id, 2025, 7).await.unwrap();

    let err = ctx
        .payroll
        .unsettle_payroll(teacher_id, 2025, 7)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let report = ctx.payroll.compute_payroll(2025, 7).await.unwrap();
    assert!(report.rows.is_empty() || !report.rows[0].is_paid);
}

#[tokio::test]
async fn payout_matrix_totals_paid_records_only() {
    let ctx = setup().await;
    let kim = seed_teacher(&ctx, "Kim", date(2024, 1, 1), 10_000, 0).await;
    let lee = seed_teacher(&ctx, "Lee", date(2024, 1, 1), 10_000, 0).await;
    seed_teacher(&ctx, "NeverPaid", date(2024, 1, 1), 10_000, 0).await;

    ctx.payroll
        .settle_payroll(kim, 2025, 1, 100_000, Some(date(2025, 2, 1)))
        .await
        .unwrap();
    ctx.payroll
        .settle_payroll(kim, 2025, 2, 110_000, Some(date(2025, 3, 1)))
        .await
        .unwrap();
    ctx.payroll
        .settle_payroll(lee, 2025, 1, 90_000, Some(date(2025, 2, 1)))
        .await
        .unwrap();

    let matrix = ctx.payroll.payout_matrix(2025).await.unwrap();
    assert_eq!(matrix.rows.len(), 2);
    assert_eq!(matrix.month_totals[0], 190_000);
    assert_eq!(matrix.month_totals[1], 110_000);
    assert_eq!(matrix.grand_total, 300_000);

    let kim_row = matrix
        .rows
        .iter()
        .find(|r| r.teacher_id == kim)
        .expect("kim row");
    assert_eq!(kim_row.total, 210_000);
}

#[tokio::test]
async fn unavailable_days_answer_date_queries() {
    let ctx = setup().await;
    let kim = seed_teacher(&ctx, "Kim", date(2025, 1, 1), 10_000, 0).await;
    let lee = seed_teacher(&ctx, "Lee", date(2025, 1, 1), 10_000, 0).await;

    let day = ctx
        .payroll
        .mark_unavailable(kim, date(2025, 9, 1), Some("conference".to_string()))
        .await
        .unwrap();
    ctx.payroll
        .mark_unavailable(lee, date(2025, 9, 2), None)
        .await
        .unwrap();

    let ids = ctx
        .payroll
        .unavailable_teacher_ids(date(2025, 9, 1))
        .await
        .unwrap();
    assert_eq!(ids, vec![kim]);

    ctx.payroll.delete_unavailable(day.id).await.unwrap();
    let ids = ctx
        .payroll
        .unavailable_teacher_ids(date(2025, 9, 1))
        .await
        .unwrap();
    assert!(ids.is_empty());
}

#[tokio::test]
async fn bulk_record_work_is_atomic() {
    let ctx = setup().await;
    let kim = seed_teacher(&ctx, "Kim", date(2025, 1, 1), 10_000, 0).await;

    let rows = vec![
        WorkRow {
            teacher_id: kim,
            start_time: time(9, 0),
            end_time: time(11, 0),
        },
        WorkRow {
            teacher_id: uuid::Uuid::new_v4(),
            start_time: time(9, 0),
            end_time: time(11, 0),
        },
    ];
    let err = ctx
        .payroll
        .bulk_record_work(date(2025, 7, 10), rows)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // The valid row rolled back with the invalid one.
    let records = ctx
        .payroll
        .work_records_for_month(kim, 2025, 7)
        .await
        .unwrap();
    assert!(records.is_empty());
}

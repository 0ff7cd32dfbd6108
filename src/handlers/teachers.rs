use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{student::Gender, teacher::TeacherStatus},
    errors::ServiceError,
    handlers::common::{created_response, no_content_response, success_response, validate_input},
    services::payroll::{NewTeacher, NewWorkRecord, TeacherChanges, WorkRow},
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeacherRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub gender: Gender,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    pub hire_date: NaiveDate,
    #[validate(range(min = 0))]
    pub base_pay: i64,
    #[validate(range(min = 0))]
    pub extra_pay: i64,
    #[validate(length(min = 1, max = 50))]
    pub bank_name: String,
    #[validate(length(min = 1, max = 50))]
    pub account_number: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeacherRequest {
    #[validate(length(min = 1, max = 100))]
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

#[derive(Debug, Deserialize)]
pub struct ListTeachersQuery {
    #[serde(default)]
    pub include_resigned: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordWorkRequest {
    pub teacher_id: Uuid,
    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub memo: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkRecordWorkRequest {
    pub work_date: NaiveDate,
    #[validate(length(min = 1))]
    pub rows: Vec<WorkRowRequest>,
}

// Serialize is required: the length check on `rows` embeds the value in
// the validation error params.
#[derive(Debug, Serialize, Deserialize)]
pub struct WorkRowRequest {
    pub teacher_id: Uuid,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SettlePayrollRequest {
    pub teacher_id: Uuid,
    pub year: i32,
    pub month: u32,
    #[validate(range(min = 0))]
    pub amount_paid: i64,
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkSettlePayrollRequest {
    pub year: i32,
    pub month: u32,
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UnsettlePayrollRequest {
    pub teacher_id: Uuid,
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MarkUnavailableRequest {
    pub teacher_id: Uuid,
    pub date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: i32,
}

// ---- teachers ---------------------------------------------------------------

async fn create_teacher(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTeacherRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let teacher = state
        .services
        .payroll
        .create_teacher(NewTeacher {
            name: payload.name,
            gender: payload.gender,
            phone: payload.phone,
            email: payload.email,
            hire_date: payload.hire_date,
            base_pay: payload.base_pay,
            extra_pay: payload.extra_pay,
            bank_name: payload.bank_name,
            account_number: payload.account_number,
        })
        .await?;
    Ok(created_response(teacher))
}

async fn list_teachers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTeachersQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let teachers = state
        .services
        .payroll
        .list_teachers(query.include_resigned)
        .await?;
    Ok(success_response(teachers))
}

async fn get_teacher(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let teacher = state.services.payroll.get_teacher(id).await?;
    Ok(success_response(teacher))
}

async fn update_teacher(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTeacherRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let teacher = state
        .services
        .payroll
        .update_teacher(
            id,
            TeacherChanges {
                name: payload.name,
                phone: payload.phone,
                email: payload.email,
                status: payload.status,
                resign_date: payload.resign_date,
                base_pay: payload.base_pay,
                extra_pay: payload.extra_pay,
                bank_name: payload.bank_name,
                account_number: payload.account_number,
            },
        )
        .await?;
    Ok(success_response(teacher))
}

async fn delete_teacher(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.payroll.delete_teacher(id).await?;
    Ok(no_content_response())
}

async fn teacher_work_records(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.payroll.get_teacher(id).await?;
    let records = state
        .services
        .payroll
        .work_records_for_month(id, query.year, query.month)
        .await?;
    Ok(success_response(records))
}

// ---- work records -------------------------------------------------------------

async fn record_work(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RecordWorkRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let record = state
        .services
        .payroll
        .record_work(NewWorkRecord {
            teacher_id: payload.teacher_id,
            work_date: payload.work_date,
            start_time: payload.start_time,
            end_time: payload.end_time,
            memo: payload.memo,
        })
        .await?;
    Ok(created_response(record))
}

async fn bulk_record_work(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BulkRecordWorkRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let rows = payload
        .rows
        .into_iter()
        .map(|r| WorkRow {
            teacher_id: r.teacher_id,
            start_time: r.start_time,
            end_time: r.end_time,
        })
        .collect();
    let count = state
        .services
        .payroll
        .bulk_record_work(payload.work_date, rows)
        .await?;
    Ok(created_response(json!({ "recorded": count })))
}

async fn delete_work_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.payroll.delete_work_record(id).await?;
    Ok(no_content_response())
}

async fn monthly_work_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state
        .services
        .payroll
        .monthly_work_summary(query.year, query.month)
        .await?;
    Ok(success_response(summary))
}

// ---- payroll --------------------------------------------------------------------

async fn compute_payroll(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state
        .services
        .payroll
        .compute_payroll(query.year, query.month)
        .await?;
    Ok(success_response(report))
}

async fn settle_payroll(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SettlePayrollRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let record = state
        .services
        .payroll
        .settle_payroll(
            payload.teacher_id,
            payload.year,
            payload.month,
            payload.amount_paid,
            payload.payment_date,
        )
        .await?;
    Ok(success_response(record))
}

async fn bulk_settle_payroll(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BulkSettlePayrollRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let count = state
        .services
        .payroll
        .bulk_settle_payroll(payload.year, payload.month, payload.payment_date)
        .await?;
    Ok(success_response(json!({ "settled": count })))
}

async fn unsettle_payroll(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UnsettlePayrollRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    state
        .services
        .payroll
        .unsettle_payroll(payload.teacher_id, payload.year, payload.month)
        .await?;
    Ok(no_content_response())
}

async fn payout_matrix(
    State(state): State<Arc<AppState>>,
    Query(query): Query<YearQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let matrix = state.services.payroll.payout_matrix(query.year).await?;
    Ok(success_response(matrix))
}

// ---- availability ----------------------------------------------------------------

async fn mark_unavailable(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MarkUnavailableRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let day = state
        .services
        .payroll
        .mark_unavailable(payload.teacher_id, payload.date, payload.reason)
        .await?;
    Ok(created_response(day))
}

async fn delete_unavailable(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.payroll.delete_unavailable(id).await?;
    Ok(no_content_response())
}

async fn unavailable_on_date(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let teacher_ids = state
        .services
        .payroll
        .unavailable_teacher_ids(query.date)
        .await?;
    Ok(success_response(json!({ "teacher_ids": teacher_ids })))
}

pub fn teacher_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_teachers).post(create_teacher))
        .route(
            "/:id",
            get(get_teacher).put(update_teacher).delete(delete_teacher),
        )
        .route("/:id/work-records", get(teacher_work_records))
}

pub fn payroll_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/work-records", post(record_work))
        .route("/work-records/bulk", post(bulk_record_work))
        .route("/work-records/:id", delete(delete_work_record))
        .route("/work-summary", get(monthly_work_summary))
        .route("/", get(compute_payroll))
        .route("/settle", post(settle_payroll))
        .route("/settle/bulk", post(bulk_settle_payroll))
        .route("/unsettle", post(unsettle_payroll))
        .route("/matrix", get(payout_matrix))
        .route("/unavailable-days", get(unavailable_on_date).post(mark_unavailable))
        .route("/unavailable-days/:id", delete(delete_unavailable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::common::validate_input;

    #[test]
    fn bulk_record_work_rejects_empty_rows() {
        let request = BulkRecordWorkRequest {
            work_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            rows: vec![],
        };
        assert!(validate_input(&request).is_err());

        let request = BulkRecordWorkRequest {
            work_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            rows: vec![WorkRowRequest {
                teacher_id: Uuid::new_v4(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            }],
        };
        assert!(validate_input(&request).is_ok());
    }
}

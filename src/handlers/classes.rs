use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::ServiceError,
    handlers::common::{created_response, no_content_response, success_response, validate_input},
    services::billing::{ClassChanges, NewClassOffering},
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub teacher_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub monthly_fee: i64,
    pub schedule: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClassRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub teacher_id: Option<Option<Uuid>>,
    pub monthly_fee: Option<i64>,
    pub schedule: Option<Option<String>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListClassesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRosterRequest {
    pub student_ids: Vec<Uuid>,
    pub reference_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EnrollRequest {
    pub student_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChargeTuitionRequest {
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub reference_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SettleTuitionRequest {
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelSettlementRequest {
    #[validate(length(min = 1))]
    pub charge_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BatchChargeRequest {
    pub reference_date: NaiveDate,
}

async fn create_class(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let class = state
        .services
        .billing
        .create_class(NewClassOffering {
            name: payload.name,
            teacher_id: payload.teacher_id,
            monthly_fee: payload.monthly_fee,
            schedule: payload.schedule,
            start_date: payload.start_date,
            end_date: payload.end_date,
        })
        .await?;
    Ok(created_response(class))
}

async fn list_classes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListClassesQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let classes = state
        .services
        .billing
        .list_classes(!query.include_inactive)
        .await?;
    Ok(success_response(classes))
}

async fn get_class(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let class = state.services.billing.get_class(id).await?;
    Ok(success_response(class))
}

async fn update_class(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClassRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let class = state
        .services
        .billing
        .update_class(
            id,
            ClassChanges {
                name: payload.name,
                teacher_id: payload.teacher_id,
                monthly_fee: payload.monthly_fee,
                schedule: payload.schedule,
                start_date: payload.start_date,
                end_date: payload.end_date,
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok(success_response(class))
}

async fn delete_class(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.billing.delete_class(id).await?;
    Ok(no_content_response())
}

async fn update_roster(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRosterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let result = state
        .services
        .billing
        .update_roster(id, payload.student_ids, payload.reference_date)
        .await?;
    Ok(success_response(result))
}

async fn enroll(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EnrollRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let enrollment = state
        .services
        .billing
        .enroll(payload.student_id, id)
        .await?;
    Ok(created_response(enrollment))
}

async fn drop_enrollment(
    State(state): State<Arc<AppState>>,
    Path((id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    let refunded = state
        .services
        .billing
        .drop_enrollment(student_id, id)
        .await?;
    Ok(success_response(json!({ "refunded": refunded })))
}

async fn charge_tuition(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChargeTuitionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let charge = state
        .services
        .billing
        .charge_tuition(payload.student_id, payload.class_id, payload.reference_date)
        .await?;
    Ok(created_response(charge))
}

async fn settle_tuition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SettleTuitionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let charge = state
        .services
        .billing
        .settle_tuition(id, payload.payment_date)
        .await?;
    Ok(success_response(charge))
}

async fn cancel_settlement(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CancelSettlementRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let count = state
        .services
        .billing
        .cancel_settlement(payload.charge_ids)
        .await?;
    Ok(success_response(json!({ "cancelled": count })))
}

async fn delete_charge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.billing.delete_charge(id).await?;
    Ok(no_content_response())
}

async fn batch_charge(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BatchChargeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let count = state
        .services
        .billing
        .batch_charge(payload.reference_date)
        .await?;
    Ok(success_response(json!({ "charged": count })))
}

pub fn class_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_classes).post(create_class))
        .route(
            "/:id",
            get(get_class).put(update_class).delete(delete_class),
        )
        .route("/:id/roster", post(update_roster))
        .route("/:id/enroll", post(enroll))
        .route(
            "/:id/enrollments/:student_id",
            axum::routing::delete(drop_enrollment),
        )
}

pub fn tuition_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/charges", post(charge_tuition))
        .route(
            "/charges/:id",
            axum::routing::delete(delete_charge),
        )
        .route("/charges/:id/settle", post(settle_tuition))
        .route("/charges/cancel-settlement", post(cancel_settlement))
        .route("/batch", post(batch_charge))
}

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::student::{Gender, StudentStatus},
    errors::ServiceError,
    handlers::common::{created_response, no_content_response, success_response, validate_input},
    services::students::{NewStudent, StudentChanges},
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub school: Option<String>,
    #[validate(length(min = 1, max = 10))]
    pub grade: String,
    pub gender: Gender,
    pub student_phone: Option<String>,
    pub parent_phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub first_class_date: Option<NaiveDate>,
    pub memo: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStudentRequest {
    #[validate(length(min = 1, max = 100))]
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

#[derive(Debug, Deserialize)]
pub struct ListStudentsQuery {
    pub status: Option<StudentStatus>,
}

async fn create_student(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let student = state
        .services
        .students
        .create_student(NewStudent {
            name: payload.name,
            school: payload.school,
            grade: payload.grade,
            gender: payload.gender,
            student_phone: payload.student_phone,
            parent_phone: payload.parent_phone,
            email: payload.email,
            first_class_date: payload.first_class_date,
            memo: payload.memo,
        })
        .await?;
    Ok(created_response(student))
}

async fn list_students(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListStudentsQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let students = state.services.students.list_students(query.status).await?;
    Ok(success_response(students))
}

async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let student = state.services.students.get_student(id).await?;
    Ok(success_response(student))
}

async fn update_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStudentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let student = state
        .services
        .students
        .update_student(
            id,
            StudentChanges {
                name: payload.name,
                school: payload.school,
                grade: payload.grade,
                student_phone: payload.student_phone,
                parent_phone: payload.parent_phone,
                email: payload.email,
                first_class_date: payload.first_class_date,
                last_class_date: payload.last_class_date,
                memo: payload.memo,
                status: payload.status,
            },
        )
        .await?;
    Ok(success_response(student))
}

async fn delete_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.students.delete_student(id).await?;
    Ok(no_content_response())
}

async fn balance_breakdown(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let breakdown = state.services.students.balance_breakdown(id).await?;
    Ok(success_response(breakdown))
}

async fn student_charges(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.students.get_student(id).await?;
    let charges = state.services.billing.list_charges_for_student(id).await?;
    Ok(success_response(charges))
}

async fn student_sales(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.students.get_student(id).await?;
    let sales = state.services.bookstore.list_sales_for_student(id).await?;
    Ok(success_response(sales))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route(
            "/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/:id/balance", get(balance_breakdown))
        .route("/:id/charges", get(student_charges))
        .route("/:id/sales", get(student_sales))
}

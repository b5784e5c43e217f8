use actix_web::{web, HttpResponse};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{AttendanceImportInput, AttendanceLogInput, PunchInput};
use crate::database::repositories::AttendanceRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::AttendanceService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub company_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeQuery {
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
}

/// Manual entry: create or replace the day's log.
pub async fn store_attendance(
    claims: Claims,
    service: web::Data<AttendanceService>,
    input: web::Json<AttendanceLogInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Only HR can record attendance manually".to_string(),
        ));
    }

    let log = service.store(input.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(log)))
}

pub async fn get_attendance(
    _claims: Claims,
    repo: web::Data<AttendanceRepository>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, AppError> {
    let logs = repo
        .list(
            query.company_id,
            query.employee_id,
            query.start_date,
            query.end_date,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(logs)))
}

pub async fn update_attendance(
    claims: Claims,
    service: web::Data<AttendanceService>,
    path: web::Path<Uuid>,
    input: web::Json<AttendanceLogInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Only HR can edit attendance".to_string(),
        ));
    }

    let log = service.update(path.into_inner(), input.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(log)))
}

pub async fn delete_attendance(
    claims: Claims,
    service: web::Data<AttendanceService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Only HR can delete attendance".to_string(),
        ));
    }

    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Kiosk punch: the first punch of the day is the time-in, the second the
/// time-out.
pub async fn punch(
    _claims: Claims,
    service: web::Data<AttendanceService>,
    input: web::Json<PunchInput>,
) -> Result<HttpResponse, AppError> {
    let now = Local::now().naive_local();
    let log = service.punch(input.employee_id, now).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(log)))
}

/// Bulk import of pre-parsed rows (spreadsheet decoding happens upstream).
pub async fn import_attendance(
    claims: Claims,
    service: web::Data<AttendanceService>,
    input: web::Json<AttendanceImportInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Only HR can import attendance".to_string(),
        ));
    }

    let logs = service.import(input.into_inner().rows).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        logs,
        "Attendance rows imported",
    )))
}

/// Compute-only preview of status/late/overtime for a punch pair.
pub async fn compute_attendance(
    _claims: Claims,
    service: web::Data<AttendanceService>,
    query: web::Query<ComputeQuery>,
) -> Result<HttpResponse, AppError> {
    let evaluation = service
        .compute(query.employee_id, query.date, query.time_in, query.time_out)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "status": evaluation.status,
        "lateMinutes": evaluation.late_minutes,
        "otMinutes": evaluation.ot_minutes,
    }))))
}

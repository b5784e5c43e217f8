use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::Datelike;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{OvertimeRequestInput, OvertimeStatus};
use crate::database::repositories::overtime::ApprovalSnapshot;
use crate::database::repositories::{EmployeeRepository, HolidayRepository, OvertimeRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::overtime_pay::calculate_payable;
use crate::services::{round_centavos, StatutoryService};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeQuery {
    pub company_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
}

/// Derived requested hours; an overnight range rolls into the next day.
fn requested_hours(input: &OvertimeRequestInput) -> BigDecimal {
    let mut minutes = (input.end_time - input.start_time).num_minutes();
    if minutes <= 0 {
        minutes += 24 * 60;
    }
    round_centavos(&(BigDecimal::from(minutes) / BigDecimal::from(60)))
}

pub async fn create_overtime_request(
    _claims: Claims,
    repo: web::Data<OvertimeRepository>,
    employee_repo: web::Data<EmployeeRepository>,
    input: web::Json<OvertimeRequestInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();

    let employment = employee_repo
        .find_active_employment(input.employee_id)
        .await?
        .ok_or_else(|| AppError::validation("Employee has no active employment"))?;

    if !employment.is_overtime_allowed {
        return Err(AppError::validation(
            "Overtime is not allowed for this employment",
        ));
    }

    let hours = requested_hours(&input);
    if hours < BigDecimal::from(1) {
        return Err(AppError::validation(
            "Overtime requests must cover at least one hour",
        ));
    }

    let request = repo
        .create(
            input.employee_id,
            employment.company_id,
            input.ot_date,
            input.start_time,
            input.end_time,
            &hours,
            input.reason.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

pub async fn get_overtime_requests(
    _claims: Claims,
    repo: web::Data<OvertimeRepository>,
    query: web::Query<OvertimeQuery>,
) -> Result<HttpResponse, AppError> {
    let status = match &query.status {
        Some(raw) => Some(
            raw.parse::<OvertimeStatus>()
                .map_err(AppError::Validation)?,
        ),
        None => None,
    };

    let requests = repo.list(query.company_id, query.employee_id, status).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

pub async fn get_overtime_request(
    _claims: Claims,
    repo: web::Data<OvertimeRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let request = repo
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Overtime request not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Approval computes the day classification, multiplier, hourly rate, and
/// payable amount now, and freezes them onto the request. Later rate edits
/// never rewrite an approved request.
pub async fn approve_overtime_request(
    claims: Claims,
    repo: web::Data<OvertimeRepository>,
    employee_repo: web::Data<EmployeeRepository>,
    holiday_repo: web::Data<HolidayRepository>,
    statutory: web::Data<StatutoryService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Insufficient permissions to approve overtime".to_string(),
        ));
    }

    let request = repo
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Overtime request not found"))?;

    if request.status != OvertimeStatus::Pending {
        return Err(AppError::validation(
            "Only pending overtime requests can be approved",
        ));
    }

    let employment = employee_repo
        .find_active_employment(request.employee_id)
        .await?
        .ok_or_else(|| AppError::validation("Employee has no active employment"))?;

    let is_rest_day = employment.is_rest_day(request.ot_date);
    let holiday = holiday_repo.find_by_date(request.ot_date).await?;
    let is_holiday = holiday.is_some();
    let holiday_type = holiday.map(|h| h.holiday_type);

    let tables = statutory.tables_for(request.ot_date.year()).await?;
    let payable = calculate_payable(
        &employment.basic_rate,
        &request.hours_requested,
        is_rest_day,
        is_holiday,
        &tables.overtime_rates,
    );

    let snapshot = ApprovalSnapshot {
        is_rest_day,
        is_holiday,
        holiday_type,
        multiplier: payable.multiplier.clone(),
        hourly_rate: round_centavos(&payable.hourly_rate),
        payable_amount: round_centavos(&payable.total),
    };

    let approved = repo.approve(request.id, claims.user_id(), &snapshot).await?;
    log::info!(
        "Overtime request {} approved at multiplier {} for {}",
        approved.id,
        snapshot.multiplier,
        snapshot.payable_amount
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(approved)))
}

pub async fn reject_overtime_request(
    claims: Claims,
    repo: web::Data<OvertimeRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Insufficient permissions to reject overtime".to_string(),
        ));
    }

    let request = repo
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Overtime request not found"))?;

    if request.status != OvertimeStatus::Pending {
        return Err(AppError::validation(
            "Only pending overtime requests can be rejected",
        ));
    }

    let rejected = repo.reject(request.id, claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(rejected)))
}

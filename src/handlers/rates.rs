use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;

use crate::database::models::OvertimeRateInput;
use crate::database::repositories::StatutoryRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::StatutoryService;

pub async fn get_overtime_rates(
    claims: Claims,
    repo: web::Data<StatutoryRepository>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden("Only HR can view rates".to_string()));
    }

    let rates = repo.list_overtime_rates().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(rates)))
}

/// Edits a multiplier going forward. Approved overtime requests keep their
/// snapshotted values.
pub async fn update_overtime_rate(
    claims: Claims,
    repo: web::Data<StatutoryRepository>,
    statutory: web::Data<StatutoryService>,
    path: web::Path<String>,
    input: web::Json<OvertimeRateInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden("Only HR can edit rates".to_string()));
    }

    if input.multiplier < BigDecimal::from(1) {
        return Err(AppError::validation("Multiplier must be at least 1.0"));
    }

    let rate = repo
        .update_overtime_rate(
            &path.into_inner(),
            &input.multiplier,
            input.is_active.unwrap_or(true),
        )
        .await?
        .ok_or_else(|| AppError::not_found("Overtime rate key not found"))?;

    // Snapshots are year-cached; drop them so the edit is visible now.
    statutory.invalidate().await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(rate)))
}

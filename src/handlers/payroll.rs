use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Payroll, PayrollInput, Payslip, PayslipUpdateInput};
use crate::database::repositories::PayrollRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::PayrollService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollQuery {
    pub company_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollDetailResponse {
    pub payroll: Payroll,
    pub payslips: Vec<Payslip>,
    pub totals: PayrollTotals,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollTotals {
    pub gross_pay: BigDecimal,
    pub total_deductions: BigDecimal,
    pub net_pay: BigDecimal,
}

impl PayrollTotals {
    fn from_payslips(payslips: &[Payslip]) -> Self {
        let zero = || BigDecimal::from(0);
        Self {
            gross_pay: payslips.iter().fold(zero(), |acc, p| acc + &p.gross_pay),
            total_deductions: payslips
                .iter()
                .fold(zero(), |acc, p| acc + &p.total_deductions),
            net_pay: payslips.iter().fold(zero(), |acc, p| acc + &p.net_pay),
        }
    }
}

/// Creates a Draft payroll and generates its payslip batch.
pub async fn generate_payroll(
    claims: Claims,
    service: web::Data<PayrollService>,
    input: web::Json<PayrollInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Only HR can generate payroll".to_string(),
        ));
    }

    let payroll = service.generate(input.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(payroll)))
}

pub async fn get_payrolls(
    claims: Claims,
    repo: web::Data<PayrollRepository>,
    query: web::Query<PayrollQuery>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden("Only HR can view payrolls".to_string()));
    }

    let payrolls = repo.list_by_company(query.company_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(payrolls)))
}

pub async fn get_payroll(
    claims: Claims,
    repo: web::Data<PayrollRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden("Only HR can view payrolls".to_string()));
    }

    let id = path.into_inner();
    let payroll = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Payroll not found"))?;
    let payslips = repo.payslips_for(id).await?;
    let totals = PayrollTotals::from_payslips(&payslips);

    Ok(HttpResponse::Ok().json(ApiResponse::success(PayrollDetailResponse {
        payroll,
        payslips,
        totals,
    })))
}

/// Locks the payroll and, transitively, every attendance log in its cutoff.
/// Idempotent when already finalized.
pub async fn finalize_payroll(
    claims: Claims,
    service: web::Data<PayrollService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Only HR can finalize payroll".to_string(),
        ));
    }

    let payroll = service.finalize(path.into_inner(), claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(payroll)))
}

pub async fn mark_payroll_paid(
    claims: Claims,
    service: web::Data<PayrollService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Only HR can mark payroll paid".to_string(),
        ));
    }

    let payroll = service.mark_paid(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(payroll)))
}

pub async fn delete_payroll(
    claims: Claims,
    service: web::Data<PayrollService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Only HR can delete payroll".to_string(),
        ));
    }

    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn update_payslip(
    claims: Claims,
    service: web::Data<PayrollService>,
    path: web::Path<Uuid>,
    input: web::Json<PayslipUpdateInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Only HR can edit payslips".to_string(),
        ));
    }

    let payslip = service
        .update_payslip(path.into_inner(), input.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(payslip)))
}

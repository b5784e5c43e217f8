use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::contributions::calculate_contributions;
use crate::services::overtime_pay::calculate_payable;
use crate::services::tax::compute_monthly_tax;
use crate::services::StatutoryService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionQuery {
    pub salary: String,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxQuery {
    pub taxable: String,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimePreviewQuery {
    pub salary: String,
    pub hours: String,
    pub rest_day: Option<bool>,
    pub holiday: Option<bool>,
}

/// Amounts arrive as strings so malformed and negative values are rejected
/// before any computation.
fn parse_amount(raw: &str, field: &str) -> Result<BigDecimal, AppError> {
    let amount: BigDecimal = raw
        .trim()
        .parse()
        .map_err(|_| AppError::validation(format!("{} must be a number", field)))?;
    if amount < BigDecimal::from(0) {
        return Err(AppError::validation(format!("{} must not be negative", field)));
    }
    Ok(amount)
}

/// Standalone contribution calculator, also consumed by the salary-offer
/// tooling in other systems.
pub async fn calculate(
    statutory: web::Data<StatutoryService>,
    query: web::Query<ContributionQuery>,
) -> Result<HttpResponse, AppError> {
    let salary = parse_amount(&query.salary, "salary")?;
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let tables = statutory.tables_for(year).await?;
    let breakdown = calculate_contributions(&tables, &salary)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(breakdown)))
}

pub async fn calculate_tax(
    statutory: web::Data<StatutoryService>,
    query: web::Query<TaxQuery>,
) -> Result<HttpResponse, AppError> {
    let taxable = parse_amount(&query.taxable, "taxable")?;
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let tables = statutory.tables_for(year).await?;
    let tax = compute_monthly_tax(&tables.tax, &taxable);

    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "taxableIncome": taxable,
        "monthlyTax": tax,
    }))))
}

/// Pure calculator exposure of the overtime payable arithmetic.
pub async fn preview_overtime_pay(
    statutory: web::Data<StatutoryService>,
    query: web::Query<OvertimePreviewQuery>,
) -> Result<HttpResponse, AppError> {
    let salary = parse_amount(&query.salary, "salary")?;
    let hours = parse_amount(&query.hours, "hours")?;

    let tables = statutory.tables_for(Utc::now().year()).await?;
    let payable = calculate_payable(
        &salary,
        &hours,
        query.rest_day.unwrap_or(false),
        query.holiday.unwrap_or(false),
        &tables.overtime_rates,
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(payable)))
}

use actix_web::{web, HttpResponse};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::database::models::HolidayInput;
use crate::database::repositories::HolidayRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayQuery {
    pub year: Option<i32>,
}

pub async fn get_holidays(
    _claims: Claims,
    repo: web::Data<HolidayRepository>,
    query: web::Query<HolidayQuery>,
) -> Result<HttpResponse, AppError> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let holidays = repo.list_for_year(year).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(holidays)))
}

pub async fn create_holiday(
    claims: Claims,
    repo: web::Data<HolidayRepository>,
    input: web::Json<HolidayInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_hr_or_admin() {
        return Err(AppError::Forbidden(
            "Only HR can manage the holiday calendar".to_string(),
        ));
    }

    let holiday = repo.create(input.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(holiday)))
}

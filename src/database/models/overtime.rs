use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::holiday::HolidayType;
use super::macros::string_enum;

/// An overtime request. On approval the rest-day/holiday classification,
/// multiplier, hourly rate, and payable amount are snapshotted onto the row
/// and never recomputed, so later rate edits do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub ot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hours_requested: BigDecimal,
    pub reason: Option<String>,
    pub status: OvertimeStatus,
    pub is_rest_day: Option<bool>,
    pub is_holiday: Option<bool>,
    pub holiday_type: Option<HolidayType>,
    pub multiplier: Option<BigDecimal>,
    pub hourly_rate_snapshot: Option<BigDecimal>,
    pub payable_amount: Option<BigDecimal>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeRequestInput {
    pub employee_id: Uuid,
    pub ot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub reason: Option<String>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum OvertimeStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// Configurable multiplier row, one per day-classification key.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeRate {
    pub id: Uuid,
    pub rate_key: String,
    pub multiplier: BigDecimal,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeRateInput {
    pub multiplier: BigDecimal,
    pub is_active: Option<bool>,
}

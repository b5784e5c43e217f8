use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

/// One attendance record per (employee, calendar date). Immutable once its
/// date falls inside a finalized or paid payroll cutoff.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceLog {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub log_date: NaiveDate,
    pub time_in: Option<NaiveDateTime>,
    pub time_out: Option<NaiveDateTime>,
    pub status: AttendanceStatus,
    pub late_minutes: i32,
    pub ot_minutes: i32,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Manual-entry payload. Punches are clock times; the service composes them
/// onto the log date and applies the cross-midnight correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceLogInput {
    pub employee_id: Uuid,
    pub log_date: NaiveDate,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PunchInput {
    pub employee_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceImportInput {
    pub rows: Vec<AttendanceLogInput>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum AttendanceStatus {
        Present => "present",
        Late => "late",
        Absent => "absent",
        Incomplete => "incomplete",
        HalfDay => "half_day",
        Leave => "leave",
        RestDay => "rest_day",
    }
}

impl Default for AttendanceStatus {
    fn default() -> Self {
        AttendanceStatus::Absent
    }
}

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_no: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub sss_no: Option<String>,
    pub philhealth_no: Option<String>,
    pub pagibig_no: Option<String>,
    pub tin_no: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An employment assignment: the pay terms and attendance policy that apply
/// to one employee at one company. Read-only during payroll computation for
/// a given cutoff.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employment {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub position: Option<String>,
    /// Monthly basic rate.
    pub basic_rate: BigDecimal,
    pub allowance: BigDecimal,
    pub shift_template_id: Option<Uuid>,
    /// ISO weekday numbers (Mon=1 .. Sun=7), comma separated.
    pub work_days: String,
    pub grace_period_minutes: i32,
    pub late_policy: LatePolicy,
    pub is_overtime_allowed: bool,
    pub is_sss_deducted: bool,
    pub is_philhealth_deducted: bool,
    pub is_pagibig_deducted: bool,
    pub is_tax_deducted: bool,
    pub is_active: bool,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employment {
    /// Whether the given weekday is a scheduled work day for this assignment.
    pub fn works_on(&self, weekday: Weekday) -> bool {
        let iso = weekday.number_from_monday();
        self.work_days
            .split(',')
            .filter_map(|d| d.trim().parse::<u32>().ok())
            .any(|d| d == iso)
    }

    pub fn is_rest_day(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        !self.works_on(date.weekday())
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum LatePolicy {
        Exact => "exact",
        Block30 => "block30",
    }
}

impl Default for LatePolicy {
    fn default() -> Self {
        LatePolicy::Exact
    }
}

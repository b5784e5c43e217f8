use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

/// Payroll run header. Lifecycle is Draft -> Finalized -> Paid with no
/// skipped states; finalizing locks every payslip and every attendance log
/// whose date falls inside the cutoff range.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payroll {
    pub id: Uuid,
    pub company_id: Uuid,
    pub cutoff_start: NaiveDate,
    pub cutoff_end: NaiveDate,
    pub payout_date: NaiveDate,
    pub status: PayrollStatus,
    pub finalized_by: Option<Uuid>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollInput {
    pub company_id: Uuid,
    pub cutoff_start: NaiveDate,
    pub cutoff_end: NaiveDate,
    pub payout_date: NaiveDate,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum PayrollStatus {
        Draft => "draft",
        Finalized => "finalized",
        Paid => "paid",
    }
}

impl PayrollStatus {
    /// Legal single-step transitions; Paid is terminal.
    pub fn can_transition_to(self, next: PayrollStatus) -> bool {
        matches!(
            (self, next),
            (PayrollStatus::Draft, PayrollStatus::Finalized)
                | (PayrollStatus::Finalized, PayrollStatus::Paid)
        )
    }

    pub fn is_locked(self) -> bool {
        matches!(self, PayrollStatus::Finalized | PayrollStatus::Paid)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payslip {
    pub id: Uuid,
    pub payroll_id: Uuid,
    pub employee_id: Uuid,
    pub reference_no: String,
    pub basic_pay: BigDecimal,
    pub allowance: BigDecimal,
    pub overtime_pay: BigDecimal,
    pub gross_pay: BigDecimal,
    pub sss_ee: BigDecimal,
    pub philhealth_ee: BigDecimal,
    pub pagibig_ee: BigDecimal,
    pub withholding_tax: BigDecimal,
    pub other_deductions: BigDecimal,
    pub total_deductions: BigDecimal,
    pub net_pay: BigDecimal,
    pub details: sqlx::types::Json<PayslipDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Itemized breakdown persisted alongside the payslip for ledger display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayslipDetails {
    pub days_in_period: i64,
    pub days_worked: i64,
    pub period_factor: String,
    pub overtime_pay: BigDecimal,
    pub deductions: Vec<DeductionLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionLine {
    pub kind: DeductionKind,
    pub label: String,
    pub amount: BigDecimal,
    /// Source row for ledger/loan lines, used when settling balances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installment_no: Option<i32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeductionKind {
    Sss,
    Philhealth,
    Pagibig,
    Tax,
    Ledger,
    Loan,
}

/// Draft-only edit payload; gross/net are recomputed from these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayslipUpdateInput {
    pub basic_pay: Option<BigDecimal>,
    pub allowance: Option<BigDecimal>,
    pub overtime_pay: Option<BigDecimal>,
    pub sss_ee: Option<BigDecimal>,
    pub philhealth_ee: Option<BigDecimal>,
    pub pagibig_ee: Option<BigDecimal>,
    pub withholding_tax: Option<BigDecimal>,
    pub other_deductions: Option<BigDecimal>,
}

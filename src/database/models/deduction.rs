use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed-amount recurring deduction collected over a number of payroll
/// installments (uniform advances, equipment charges, and the like).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeductionLedger {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub label: String,
    pub amount_per_period: BigDecimal,
    pub installments_total: i32,
    pub installments_paid: i32,
    pub remaining_balance: BigDecimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeductionLedger {
    pub fn is_settled(&self) -> bool {
        self.installments_paid >= self.installments_total
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub loan_type: String,
    pub principal: BigDecimal,
    pub monthly_amortization: BigDecimal,
    pub remaining_balance: BigDecimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

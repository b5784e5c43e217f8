use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{DeductionLedger, Loan};

#[derive(Clone)]
pub struct DeductionRepository {
    pool: PgPool,
}

impl DeductionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn active_ledgers_for(&self, employee_id: Uuid) -> Result<Vec<DeductionLedger>> {
        let ledgers = sqlx::query_as::<_, DeductionLedger>(
            r#"
            SELECT
                id, employee_id, label, amount_per_period, installments_total,
                installments_paid, remaining_balance, is_active,
                created_at, updated_at
            FROM
                deduction_ledgers
            WHERE
                employee_id = $1 AND is_active = TRUE
            ORDER BY
                created_at
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ledgers)
    }

    pub async fn active_loans_for(&self, employee_id: Uuid) -> Result<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT
                id, employee_id, loan_type, principal, monthly_amortization,
                remaining_balance, is_active, created_at, updated_at
            FROM
                loans
            WHERE
                employee_id = $1 AND is_active = TRUE
            ORDER BY
                created_at
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Settle one collected installment; deactivates the ledger once fully
    /// collected. Runs inside the mark-paid transaction.
    pub async fn settle_ledger_installment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ledger_id: Uuid,
        amount: &BigDecimal,
    ) -> Result<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE deduction_ledgers
            SET
                installments_paid = installments_paid + 1,
                remaining_balance = GREATEST(remaining_balance - $1, 0),
                is_active = (installments_paid + 1 < installments_total
                             AND remaining_balance - $1 > 0),
                updated_at = $2
            WHERE
                id = $3
            "#,
        )
        .bind(amount)
        .bind(now)
        .bind(ledger_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Settle one collected amortization; closes the loan at zero balance.
    /// Runs inside the mark-paid transaction.
    pub async fn settle_loan_amortization(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        loan_id: Uuid,
        amount: &BigDecimal,
    ) -> Result<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE loans
            SET
                remaining_balance = GREATEST(remaining_balance - $1, 0),
                is_active = (remaining_balance - $1 > 0),
                updated_at = $2
            WHERE
                id = $3
            "#,
        )
        .bind(amount)
        .bind(now)
        .bind(loan_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

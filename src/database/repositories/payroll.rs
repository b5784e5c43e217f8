use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{
    Payroll, PayrollInput, PayrollStatus, Payslip, PayslipDetails,
};

const PAYROLL_COLUMNS: &str = r#"
    id, company_id, cutoff_start, cutoff_end, payout_date, status,
    finalized_by, finalized_at, created_at, updated_at
"#;

const PAYSLIP_COLUMNS: &str = r#"
    id, payroll_id, employee_id, reference_no, basic_pay, allowance,
    overtime_pay, gross_pay, sss_ee, philhealth_ee, pagibig_ee,
    withholding_tax, other_deductions, total_deductions, net_pay, details,
    created_at, updated_at
"#;

/// Amounts for one generated payslip, inserted inside the batch transaction.
#[derive(Debug, Clone)]
pub struct NewPayslip {
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
    pub details: PayslipDetails,
}

#[derive(Clone)]
pub struct PayrollRepository {
    pool: PgPool,
}

impl PayrollRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_payroll(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        input: &PayrollInput,
    ) -> Result<Payroll> {
        let now = Utc::now();

        let payroll = sqlx::query_as::<_, Payroll>(&format!(
            r#"
            INSERT INTO
                payrolls (
                    company_id, cutoff_start, cutoff_end, payout_date,
                    status, created_at, updated_at
                )
            VALUES
                ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {}
            "#,
            PAYROLL_COLUMNS
        ))
        .bind(input.company_id)
        .bind(input.cutoff_start)
        .bind(input.cutoff_end)
        .bind(input.payout_date)
        .bind(PayrollStatus::Draft)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;

        Ok(payroll)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Payroll>> {
        let payroll = sqlx::query_as::<_, Payroll>(&format!(
            "SELECT {} FROM payrolls WHERE id = $1",
            PAYROLL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payroll)
    }

    /// Row-locked read used by the status transitions.
    pub async fn find_by_id_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Payroll>> {
        let payroll = sqlx::query_as::<_, Payroll>(&format!(
            "SELECT {} FROM payrolls WHERE id = $1 FOR UPDATE",
            PAYROLL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(payroll)
    }

    pub async fn find_by_cutoff(
        &self,
        company_id: Uuid,
        cutoff_start: NaiveDate,
        cutoff_end: NaiveDate,
    ) -> Result<Option<Payroll>> {
        let payroll = sqlx::query_as::<_, Payroll>(&format!(
            r#"
            SELECT {}
            FROM payrolls
            WHERE company_id = $1 AND cutoff_start = $2 AND cutoff_end = $3
            "#,
            PAYROLL_COLUMNS
        ))
        .bind(company_id)
        .bind(cutoff_start)
        .bind(cutoff_end)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payroll)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Payroll>> {
        let payrolls = sqlx::query_as::<_, Payroll>(&format!(
            r#"
            SELECT {}
            FROM payrolls
            WHERE company_id = $1
            ORDER BY cutoff_start DESC
            "#,
            PAYROLL_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payrolls)
    }

    pub async fn set_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: PayrollStatus,
        actor: Option<Uuid>,
    ) -> Result<Payroll> {
        let now = Utc::now();
        let stamp_finalized = status == PayrollStatus::Finalized;

        let payroll = sqlx::query_as::<_, Payroll>(&format!(
            r#"
            UPDATE payrolls
            SET
                status = $1,
                finalized_by = CASE WHEN $2 THEN $3 ELSE finalized_by END,
                finalized_at = CASE WHEN $2 THEN $4 ELSE finalized_at END,
                updated_at = $4
            WHERE
                id = $5
            RETURNING {}
            "#,
            PAYROLL_COLUMNS
        ))
        .bind(status)
        .bind(stamp_finalized)
        .bind(actor)
        .bind(now)
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(payroll)
    }

    /// Draft deletion cascades to payslips via the schema.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM payrolls WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn insert_payslip(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payroll_id: Uuid,
        payslip: &NewPayslip,
    ) -> Result<Payslip> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, Payslip>(&format!(
            r#"
            INSERT INTO
                payslips (
                    payroll_id, employee_id, reference_no, basic_pay,
                    allowance, overtime_pay, gross_pay, sss_ee, philhealth_ee,
                    pagibig_ee, withholding_tax, other_deductions,
                    total_deductions, net_pay, details, created_at, updated_at
                )
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                 $15, $16, $16)
            RETURNING {}
            "#,
            PAYSLIP_COLUMNS
        ))
        .bind(payroll_id)
        .bind(payslip.employee_id)
        .bind(&payslip.reference_no)
        .bind(&payslip.basic_pay)
        .bind(&payslip.allowance)
        .bind(&payslip.overtime_pay)
        .bind(&payslip.gross_pay)
        .bind(&payslip.sss_ee)
        .bind(&payslip.philhealth_ee)
        .bind(&payslip.pagibig_ee)
        .bind(&payslip.withholding_tax)
        .bind(&payslip.other_deductions)
        .bind(&payslip.total_deductions)
        .bind(&payslip.net_pay)
        .bind(Json(&payslip.details))
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }

    pub async fn payslips_for(&self, payroll_id: Uuid) -> Result<Vec<Payslip>> {
        let payslips = sqlx::query_as::<_, Payslip>(&format!(
            r#"
            SELECT {}
            FROM payslips
            WHERE payroll_id = $1
            ORDER BY reference_no
            "#,
            PAYSLIP_COLUMNS
        ))
        .bind(payroll_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payslips)
    }

    pub async fn find_payslip(&self, id: Uuid) -> Result<Option<Payslip>> {
        let payslip = sqlx::query_as::<_, Payslip>(&format!(
            "SELECT {} FROM payslips WHERE id = $1",
            PAYSLIP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payslip)
    }

    pub async fn update_payslip(&self, payslip: &Payslip) -> Result<Payslip> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, Payslip>(&format!(
            r#"
            UPDATE payslips
            SET
                basic_pay = $1,
                allowance = $2,
                overtime_pay = $3,
                gross_pay = $4,
                sss_ee = $5,
                philhealth_ee = $6,
                pagibig_ee = $7,
                withholding_tax = $8,
                other_deductions = $9,
                total_deductions = $10,
                net_pay = $11,
                updated_at = $12
            WHERE
                id = $13
            RETURNING {}
            "#,
            PAYSLIP_COLUMNS
        ))
        .bind(&payslip.basic_pay)
        .bind(&payslip.allowance)
        .bind(&payslip.overtime_pay)
        .bind(&payslip.gross_pay)
        .bind(&payslip.sss_ee)
        .bind(&payslip.philhealth_ee)
        .bind(&payslip.pagibig_ee)
        .bind(&payslip.withholding_tax)
        .bind(&payslip.other_deductions)
        .bind(&payslip.total_deductions)
        .bind(&payslip.net_pay)
        .bind(now)
        .bind(payslip.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// The single lock query every attendance mutation path goes through:
    /// is the date covered by a finalized or paid payroll for this company?
    pub async fn is_date_locked(&self, company_id: Uuid, date: NaiveDate) -> Result<bool> {
        let locked = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM payrolls
                WHERE company_id = $1
                  AND status IN ('finalized', 'paid')
                  AND $2 BETWEEN cutoff_start AND cutoff_end
            )
            "#,
        )
        .bind(company_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(locked)
    }
}

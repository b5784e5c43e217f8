use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    HolidayType, OvertimeRequest, OvertimeStatus,
};

const OVERTIME_COLUMNS: &str = r#"
    id, employee_id, company_id, ot_date, start_time, end_time,
    hours_requested, reason, status, is_rest_day, is_holiday, holiday_type,
    multiplier, hourly_rate_snapshot, payable_amount, approved_by,
    approved_at, created_at, updated_at
"#;

/// Frozen classification and amounts written at approval time.
#[derive(Debug, Clone)]
pub struct ApprovalSnapshot {
    pub is_rest_day: bool,
    pub is_holiday: bool,
    pub holiday_type: Option<HolidayType>,
    pub multiplier: BigDecimal,
    pub hourly_rate: BigDecimal,
    pub payable_amount: BigDecimal,
}

#[derive(Clone)]
pub struct OvertimeRepository {
    pool: PgPool,
}

impl OvertimeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        employee_id: Uuid,
        company_id: Uuid,
        ot_date: NaiveDate,
        start_time: chrono::NaiveTime,
        end_time: chrono::NaiveTime,
        hours_requested: &BigDecimal,
        reason: Option<&str>,
    ) -> Result<OvertimeRequest> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, OvertimeRequest>(&format!(
            r#"
            INSERT INTO
                overtime_requests (
                    employee_id, company_id, ot_date, start_time, end_time,
                    hours_requested, reason, status, created_at, updated_at
                )
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {}
            "#,
            OVERTIME_COLUMNS
        ))
        .bind(employee_id)
        .bind(company_id)
        .bind(ot_date)
        .bind(start_time)
        .bind(end_time)
        .bind(hours_requested)
        .bind(reason)
        .bind(OvertimeStatus::Pending)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<OvertimeRequest>> {
        let request = sqlx::query_as::<_, OvertimeRequest>(&format!(
            "SELECT {} FROM overtime_requests WHERE id = $1",
            OVERTIME_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        employee_id: Option<Uuid>,
        status: Option<OvertimeStatus>,
    ) -> Result<Vec<OvertimeRequest>> {
        let mut query = format!(
            "SELECT {} FROM overtime_requests WHERE company_id = $1",
            OVERTIME_COLUMNS
        );
        let mut idx = 1;

        if employee_id.is_some() {
            idx += 1;
            query.push_str(&format!(" AND employee_id = ${}", idx));
        }
        if status.is_some() {
            idx += 1;
            query.push_str(&format!(" AND status = ${}", idx));
        }
        query.push_str(" ORDER BY ot_date DESC, created_at DESC");

        let mut prepared = sqlx::query_as::<_, OvertimeRequest>(&query).bind(company_id);
        if let Some(eid) = employee_id {
            prepared = prepared.bind(eid);
        }
        if let Some(s) = status {
            prepared = prepared.bind(s);
        }

        let requests = prepared.fetch_all(&self.pool).await?;

        Ok(requests)
    }

    /// Approve and persist the computed snapshot in one write. The snapshot
    /// columns are never touched again after this.
    pub async fn approve(
        &self,
        id: Uuid,
        approved_by: Uuid,
        snapshot: &ApprovalSnapshot,
    ) -> Result<OvertimeRequest> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, OvertimeRequest>(&format!(
            r#"
            UPDATE overtime_requests
            SET
                status = $1,
                is_rest_day = $2,
                is_holiday = $3,
                holiday_type = $4,
                multiplier = $5,
                hourly_rate_snapshot = $6,
                payable_amount = $7,
                approved_by = $8,
                approved_at = $9,
                updated_at = $9
            WHERE
                id = $10
            RETURNING {}
            "#,
            OVERTIME_COLUMNS
        ))
        .bind(OvertimeStatus::Approved)
        .bind(snapshot.is_rest_day)
        .bind(snapshot.is_holiday)
        .bind(snapshot.holiday_type)
        .bind(&snapshot.multiplier)
        .bind(&snapshot.hourly_rate)
        .bind(&snapshot.payable_amount)
        .bind(approved_by)
        .bind(now)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn reject(&self, id: Uuid, rejected_by: Uuid) -> Result<OvertimeRequest> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, OvertimeRequest>(&format!(
            r#"
            UPDATE overtime_requests
            SET
                status = $1,
                approved_by = $2,
                updated_at = $3
            WHERE
                id = $4
            RETURNING {}
            "#,
            OVERTIME_COLUMNS
        ))
        .bind(OvertimeStatus::Rejected)
        .bind(rejected_by)
        .bind(now)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    /// Sum of approved, snapshotted payable amounts inside a cutoff.
    pub async fn sum_approved_payable(
        &self,
        employee_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BigDecimal> {
        let total = sqlx::query_scalar::<_, Option<BigDecimal>>(
            r#"
            SELECT SUM(payable_amount)
            FROM overtime_requests
            WHERE employee_id = $1
              AND status = 'approved'
              AND ot_date BETWEEN $2 AND $3
            "#,
        )
        .bind(employee_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or_else(|| BigDecimal::from(0)))
    }
}

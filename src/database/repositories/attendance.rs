use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::AttendanceLog;
use crate::services::attendance::AttendanceEvaluation;

const ATTENDANCE_COLUMNS: &str = r#"
    id, employee_id, company_id, log_date, time_in, time_out, status,
    late_minutes, ot_minutes, remarks, created_at, updated_at
"#;

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AttendanceLog>> {
        let log = sqlx::query_as::<_, AttendanceLog>(&format!(
            "SELECT {} FROM attendance_logs WHERE id = $1",
            ATTENDANCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(log)
    }

    pub async fn find_by_employee_date(
        &self,
        employee_id: Uuid,
        log_date: NaiveDate,
    ) -> Result<Option<AttendanceLog>> {
        let log = sqlx::query_as::<_, AttendanceLog>(&format!(
            "SELECT {} FROM attendance_logs WHERE employee_id = $1 AND log_date = $2",
            ATTENDANCE_COLUMNS
        ))
        .bind(employee_id)
        .bind(log_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(log)
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        employee_id: Option<Uuid>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<AttendanceLog>> {
        let mut query = format!(
            "SELECT {} FROM attendance_logs WHERE company_id = $1",
            ATTENDANCE_COLUMNS
        );
        let mut idx = 1;

        if employee_id.is_some() {
            idx += 1;
            query.push_str(&format!(" AND employee_id = ${}", idx));
        }
        if start_date.is_some() {
            idx += 1;
            query.push_str(&format!(" AND log_date >= ${}", idx));
        }
        if end_date.is_some() {
            idx += 1;
            query.push_str(&format!(" AND log_date <= ${}", idx));
        }
        query.push_str(" ORDER BY log_date DESC, created_at DESC");

        let mut prepared = sqlx::query_as::<_, AttendanceLog>(&query).bind(company_id);
        if let Some(eid) = employee_id {
            prepared = prepared.bind(eid);
        }
        if let Some(sd) = start_date {
            prepared = prepared.bind(sd);
        }
        if let Some(ed) = end_date {
            prepared = prepared.bind(ed);
        }

        let logs = prepared.fetch_all(&self.pool).await?;

        Ok(logs)
    }

    pub async fn insert(
        &self,
        employee_id: Uuid,
        company_id: Uuid,
        log_date: NaiveDate,
        evaluation: &AttendanceEvaluation,
        remarks: Option<&str>,
    ) -> Result<AttendanceLog> {
        let now = Utc::now();

        let log = sqlx::query_as::<_, AttendanceLog>(&format!(
            r#"
            INSERT INTO
                attendance_logs (
                    employee_id, company_id, log_date, time_in, time_out,
                    status, late_minutes, ot_minutes, remarks,
                    created_at, updated_at
                )
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING {}
            "#,
            ATTENDANCE_COLUMNS
        ))
        .bind(employee_id)
        .bind(company_id)
        .bind(log_date)
        .bind(evaluation.time_in)
        .bind(evaluation.time_out)
        .bind(evaluation.status)
        .bind(evaluation.late_minutes)
        .bind(evaluation.ot_minutes)
        .bind(remarks)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    pub async fn update(
        &self,
        id: Uuid,
        evaluation: &AttendanceEvaluation,
        remarks: Option<&str>,
    ) -> Result<AttendanceLog> {
        let now = Utc::now();

        let log = sqlx::query_as::<_, AttendanceLog>(&format!(
            r#"
            UPDATE attendance_logs
            SET
                time_in = $1,
                time_out = $2,
                status = $3,
                late_minutes = $4,
                ot_minutes = $5,
                remarks = $6,
                updated_at = $7
            WHERE
                id = $8
            RETURNING {}
            "#,
            ATTENDANCE_COLUMNS
        ))
        .bind(evaluation.time_in)
        .bind(evaluation.time_out)
        .bind(evaluation.status)
        .bind(evaluation.late_minutes)
        .bind(evaluation.ot_minutes)
        .bind(remarks)
        .bind(now)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM attendance_logs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Days with a worked status inside a cutoff, for payslip details.
    pub async fn count_worked_days(
        &self,
        employee_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM attendance_logs
            WHERE employee_id = $1
              AND log_date BETWEEN $2 AND $3
              AND status IN ('present', 'late', 'half_day')
            "#,
        )
        .bind(employee_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

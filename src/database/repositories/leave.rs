use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::LeaveRequest;

/// Read-only view over the external leave workflow. Attendance writes are
/// blocked entirely when a pending or approved leave covers the date.
#[derive(Clone)]
pub struct LeaveRepository {
    pool: PgPool,
}

impl LeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The pending/approved leave covering the date, if any.
    pub async fn find_blocking_leave(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<LeaveRequest>> {
        let leave = sqlx::query_as::<_, LeaveRequest>(
            r#"
            SELECT
                id, employee_id, leave_type, start_date, end_date, reason,
                status, created_at, updated_at
            FROM
                leave_requests
            WHERE
                employee_id = $1
                AND status IN ('pending', 'approved')
                AND $2 BETWEEN start_date AND end_date
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(leave)
    }
}

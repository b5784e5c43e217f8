use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Employee, Employment, ShiftTemplate};

const EMPLOYEE_COLUMNS: &str = r#"
    id, company_id, employee_no, first_name, last_name, email,
    sss_no, philhealth_no, pagibig_no, tin_no, created_at, updated_at
"#;

const EMPLOYMENT_COLUMNS: &str = r#"
    id, employee_id, company_id, position, basic_rate, allowance,
    shift_template_id, work_days, grace_period_minutes, late_policy,
    is_overtime_allowed, is_sss_deducted, is_philhealth_deducted,
    is_pagibig_deducted, is_tax_deducted, is_active, start_date, end_date,
    created_at, updated_at
"#;

/// Read-only view over the employee roster and active employment
/// assignments; the records themselves are maintained by the HR CRUD
/// surface outside this service.
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {} FROM employees WHERE id = $1",
            EMPLOYEE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {} FROM employees WHERE company_id = $1 ORDER BY last_name, first_name",
            EMPLOYEE_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    pub async fn find_active_employment(&self, employee_id: Uuid) -> Result<Option<Employment>> {
        let employment = sqlx::query_as::<_, Employment>(&format!(
            r#"
            SELECT {}
            FROM employments
            WHERE employee_id = $1 AND is_active = TRUE
            ORDER BY start_date DESC
            LIMIT 1
            "#,
            EMPLOYMENT_COLUMNS
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employment)
    }

    /// The payroll roster: every active employment assignment in a company.
    pub async fn list_active_employments(&self, company_id: Uuid) -> Result<Vec<Employment>> {
        let employments = sqlx::query_as::<_, Employment>(&format!(
            r#"
            SELECT {}
            FROM employments
            WHERE company_id = $1 AND is_active = TRUE
            ORDER BY created_at
            "#,
            EMPLOYMENT_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(employments)
    }

    pub async fn find_shift_template(&self, id: Uuid) -> Result<Option<ShiftTemplate>> {
        let shift = sqlx::query_as::<_, ShiftTemplate>(
            r#"
            SELECT
                id, company_id, name, start_time, end_time, created_at, updated_at
            FROM
                shift_templates
            WHERE
                id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }
}

use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::PgPool;

use crate::database::models::{
    OvertimeRate, PagibigBracket, PhilhealthConfig, SssBracket, TaxBracket,
};

/// Year-scoped statutory configuration: SSS/PhilHealth/Pag-IBIG brackets,
/// withholding tax table, and overtime multipliers.
#[derive(Clone)]
pub struct StatutoryRepository {
    pool: PgPool,
}

impl StatutoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn active_sss_brackets(&self, year: i32) -> Result<Vec<SssBracket>> {
        let brackets = sqlx::query_as::<_, SssBracket>(
            r#"
            SELECT
                id, effective_year, min_salary, max_salary, msc,
                ee_rate, er_rate, ec_amount, is_active
            FROM
                sss_brackets
            WHERE
                effective_year = $1 AND is_active = TRUE
            ORDER BY
                min_salary
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(brackets)
    }

    pub async fn active_philhealth_config(&self, year: i32) -> Result<Option<PhilhealthConfig>> {
        let config = sqlx::query_as::<_, PhilhealthConfig>(
            r#"
            SELECT
                id, effective_year, min_salary, max_salary, premium_rate,
                ee_share_percent, er_share_percent, is_active
            FROM
                philhealth_configs
            WHERE
                effective_year = $1 AND is_active = TRUE
            LIMIT 1
            "#,
        )
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    pub async fn active_pagibig_brackets(&self, year: i32) -> Result<Vec<PagibigBracket>> {
        let brackets = sqlx::query_as::<_, PagibigBracket>(
            r#"
            SELECT
                id, effective_year, min_salary, max_salary, ee_rate, er_rate,
                max_fund_salary, is_active
            FROM
                pagibig_brackets
            WHERE
                effective_year = $1 AND is_active = TRUE
            ORDER BY
                min_salary
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(brackets)
    }

    pub async fn active_tax_brackets(&self, year: i32) -> Result<Vec<TaxBracket>> {
        let brackets = sqlx::query_as::<_, TaxBracket>(
            r#"
            SELECT
                id, effective_year, min_salary, max_salary, base_tax,
                percentage, excess_over, is_active
            FROM
                tax_brackets
            WHERE
                effective_year = $1 AND is_active = TRUE
            ORDER BY
                min_salary
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(brackets)
    }

    pub async fn active_overtime_rates(&self) -> Result<Vec<OvertimeRate>> {
        let rates = sqlx::query_as::<_, OvertimeRate>(
            r#"
            SELECT
                id, rate_key, multiplier, is_active, updated_at
            FROM
                overtime_rates
            WHERE
                is_active = TRUE
            ORDER BY
                rate_key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rates)
    }

    pub async fn list_overtime_rates(&self) -> Result<Vec<OvertimeRate>> {
        let rates = sqlx::query_as::<_, OvertimeRate>(
            r#"
            SELECT
                id, rate_key, multiplier, is_active, updated_at
            FROM
                overtime_rates
            ORDER BY
                rate_key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rates)
    }

    pub async fn update_overtime_rate(
        &self,
        rate_key: &str,
        multiplier: &BigDecimal,
        is_active: bool,
    ) -> Result<Option<OvertimeRate>> {
        let now = Utc::now();

        let rate = sqlx::query_as::<_, OvertimeRate>(
            r#"
            UPDATE overtime_rates
            SET
                multiplier = $1,
                is_active = $2,
                updated_at = $3
            WHERE
                rate_key = $4
            RETURNING
                id, rate_key, multiplier, is_active, updated_at
            "#,
        )
        .bind(multiplier)
        .bind(is_active)
        .bind(now)
        .bind(rate_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rate)
    }
}

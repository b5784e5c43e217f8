use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::database::models::{Holiday, HolidayInput};

#[derive(Clone)]
pub struct HolidayRepository {
    pool: PgPool,
}

impl HolidayRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: HolidayInput) -> Result<Holiday> {
        let holiday = sqlx::query_as::<_, Holiday>(
            r#"
            INSERT INTO
                holidays (holiday_date, name, holiday_type)
            VALUES
                ($1, $2, $3)
            RETURNING
                id, holiday_date, name, holiday_type, created_at
            "#,
        )
        .bind(input.holiday_date)
        .bind(&input.name)
        .bind(input.holiday_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(holiday)
    }

    pub async fn find_by_date(&self, date: NaiveDate) -> Result<Option<Holiday>> {
        let holiday = sqlx::query_as::<_, Holiday>(
            r#"
            SELECT
                id, holiday_date, name, holiday_type, created_at
            FROM
                holidays
            WHERE
                holiday_date = $1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(holiday)
    }

    pub async fn list_for_year(&self, year: i32) -> Result<Vec<Holiday>> {
        let holidays = sqlx::query_as::<_, Holiday>(
            r#"
            SELECT
                id, holiday_date, name, holiday_type, created_at
            FROM
                holidays
            WHERE
                EXTRACT(YEAR FROM holiday_date) = $1
            ORDER BY
                holiday_date
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(holidays)
    }
}

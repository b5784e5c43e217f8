use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use moka::future::Cache;

use crate::database::models::{PagibigBracket, PhilhealthConfig, SssBracket, TaxBracket};
use crate::database::repositories::StatutoryRepository;
use crate::error::AppError;
use crate::services::contributions::validate_bracket_tiling;

/// Immutable snapshot of one year's active statutory configuration. A
/// computation resolves its snapshot once and uses it for the whole
/// operation, so concurrent administrative edits cannot tear a calculation.
#[derive(Debug, Clone)]
pub struct StatutoryTables {
    pub year: i32,
    pub sss: Vec<SssBracket>,
    pub philhealth: Option<PhilhealthConfig>,
    pub pagibig: Vec<PagibigBracket>,
    pub tax: Vec<TaxBracket>,
    pub overtime_rates: HashMap<String, BigDecimal>,
}

/// Year-keyed snapshot cache over the statutory tables. The tables are
/// read-mostly and rewritten rarely, so a short TTL keeps administrative
/// edits visible without hitting the database on every payslip.
#[derive(Clone)]
pub struct StatutoryService {
    repository: StatutoryRepository,
    cache: Cache<i32, Arc<StatutoryTables>>,
}

impl StatutoryService {
    pub fn new(repository: StatutoryRepository) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(60))
            .build();
        Self { repository, cache }
    }

    pub async fn tables_for(&self, year: i32) -> Result<Arc<StatutoryTables>, AppError> {
        if let Some(hit) = self.cache.get(&year).await {
            return Ok(hit);
        }

        let tables = Arc::new(self.load(year).await?);
        self.cache.insert(year, tables.clone()).await;
        Ok(tables)
    }

    /// Drop cached snapshots after an administrative edit.
    pub async fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    async fn load(&self, year: i32) -> Result<StatutoryTables, AppError> {
        let sss = self.repository.active_sss_brackets(year).await?;
        let philhealth = self.repository.active_philhealth_config(year).await?;
        let pagibig = self.repository.active_pagibig_brackets(year).await?;
        let tax = self.repository.active_tax_brackets(year).await?;

        let domain_end: BigDecimal = "9999999".parse().expect("domain end literal");
        if let Err(reason) = validate_bracket_tiling(&sss, &domain_end) {
            log::warn!("SSS brackets for {} do not tile the salary domain: {}", year, reason);
        }
        if let Err(reason) = validate_bracket_tiling(&pagibig, &domain_end) {
            log::warn!(
                "Pag-IBIG brackets for {} do not tile the salary domain: {}",
                year,
                reason
            );
        }
        if let Err(reason) = validate_bracket_tiling(&tax, &domain_end) {
            log::warn!("Tax brackets for {} do not tile the salary domain: {}", year, reason);
        }

        let overtime_rates = self
            .repository
            .active_overtime_rates()
            .await?
            .into_iter()
            .map(|rate| (rate.rate_key, rate.multiplier))
            .collect();

        Ok(StatutoryTables {
            year,
            sss,
            philhealth,
            pagibig,
            tax,
            overtime_rates,
        })
    }
}

/// Builders mirroring the seeded 2025 tables, for engine unit tests.
#[cfg(test)]
pub mod test_fixtures {
    use super::*;
    use uuid::Uuid;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn sss_bracket(min: &str, max: &str, msc: &str, ec: &str) -> SssBracket {
        SssBracket {
            id: Uuid::new_v4(),
            effective_year: 2025,
            min_salary: dec(min),
            max_salary: dec(max),
            msc: dec(msc),
            ee_rate: dec("0.05"),
            er_rate: dec("0.10"),
            ec_amount: dec(ec),
            is_active: true,
        }
    }

    /// The 2025 MSC ladder: 5,000 to 35,000 in 500-peso steps.
    pub fn sss_ladder_2025() -> Vec<SssBracket> {
        let mut ladder = vec![sss_bracket("0", "5249.99", "5000", "10.00")];
        let mut msc = 5500;
        while msc <= 34500 {
            let ec = if msc < 15000 { "10.00" } else { "30.00" };
            ladder.push(sss_bracket(
                &format!("{}", msc - 250),
                &format!("{}.99", msc + 249),
                &format!("{}", msc),
                ec,
            ));
            msc += 500;
        }
        ladder.push(sss_bracket("34750", "99999999.99", "35000", "30.00"));
        ladder
    }

    pub fn philhealth_config_2025() -> PhilhealthConfig {
        PhilhealthConfig {
            id: Uuid::new_v4(),
            effective_year: 2025,
            min_salary: dec("10000"),
            max_salary: dec("100000"),
            premium_rate: dec("0.05"),
            ee_share_percent: dec("50.00"),
            er_share_percent: dec("50.00"),
            is_active: true,
        }
    }

    pub fn pagibig_tiers_2025() -> Vec<PagibigBracket> {
        let tier = |min: &str, max: &str, ee: &str| PagibigBracket {
            id: Uuid::new_v4(),
            effective_year: 2025,
            min_salary: dec(min),
            max_salary: dec(max),
            ee_rate: dec(ee),
            er_rate: dec("0.02"),
            max_fund_salary: dec("10000"),
            is_active: true,
        };
        vec![
            tier("0", "1499.99", "0.01"),
            tier("1500", "99999999.99", "0.02"),
        ]
    }

    pub fn tax_table_2025() -> Vec<TaxBracket> {
        let bracket = |min: &str, max: &str, base: &str, pct: &str, over: &str| TaxBracket {
            id: Uuid::new_v4(),
            effective_year: 2025,
            min_salary: dec(min),
            max_salary: dec(max),
            base_tax: dec(base),
            percentage: dec(pct),
            excess_over: dec(over),
            is_active: true,
        };
        vec![
            bracket("0", "20833.00", "0", "0", "0"),
            bracket("20833.01", "33333.00", "0", "15.00", "20833"),
            bracket("33333.01", "66667.00", "1875.00", "20.00", "33333"),
            bracket("66667.01", "166667.00", "8541.80", "25.00", "66667"),
            bracket("166667.01", "666667.00", "33541.80", "30.00", "166667"),
            bracket("666667.01", "99999999.99", "183541.80", "35.00", "666667"),
        ]
    }

    pub fn tables_2025() -> StatutoryTables {
        StatutoryTables {
            year: 2025,
            sss: sss_ladder_2025(),
            philhealth: Some(philhealth_config_2025()),
            pagibig: pagibig_tiers_2025(),
            tax: tax_table_2025(),
            overtime_rates: HashMap::new(),
        }
    }
}

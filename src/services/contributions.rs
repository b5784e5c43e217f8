use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::database::models::{PagibigBracket, PhilhealthConfig, SssBracket, TaxBracket};
use crate::error::AppError;
use crate::services::round_centavos;
use crate::services::statutory::StatutoryTables;

/// Salary-range row in a year-scoped statutory table.
pub trait SalaryBand {
    fn min_salary(&self) -> &BigDecimal;
    fn max_salary(&self) -> &BigDecimal;
}

impl SalaryBand for SssBracket {
    fn min_salary(&self) -> &BigDecimal {
        &self.min_salary
    }
    fn max_salary(&self) -> &BigDecimal {
        &self.max_salary
    }
}

impl SalaryBand for PagibigBracket {
    fn min_salary(&self) -> &BigDecimal {
        &self.min_salary
    }
    fn max_salary(&self) -> &BigDecimal {
        &self.max_salary
    }
}

impl SalaryBand for TaxBracket {
    fn min_salary(&self) -> &BigDecimal {
        &self.min_salary
    }
    fn max_salary(&self) -> &BigDecimal {
        &self.max_salary
    }
}

/// Outcome of a bracket lookup. Fallback variants mean the salary fell
/// outside the seeded ranges; they keep the system functional but indicate
/// incomplete bracket seeding and are logged as data-quality warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketResolution<'a, B> {
    Exact(&'a B),
    FallbackLowest(&'a B),
    FallbackHighest(&'a B),
}

impl<'a, B> BracketResolution<'a, B> {
    pub fn bracket(&self) -> &'a B {
        match self {
            BracketResolution::Exact(b)
            | BracketResolution::FallbackLowest(b)
            | BracketResolution::FallbackHighest(b) => b,
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, BracketResolution::Exact(_))
    }
}

/// Finds the bracket whose inclusive range contains `salary`. Expects the
/// slice sorted by `min_salary`. On a miss, salaries below the table fall
/// back to the lowest bracket and salaries above (or in an interior gap)
/// fall back to the highest bracket at or below the salary. Returns `None`
/// only for an empty table.
pub fn resolve_bracket<'a, B: SalaryBand>(
    brackets: &'a [B],
    salary: &BigDecimal,
) -> Option<BracketResolution<'a, B>> {
    let first = brackets.first()?;

    if salary < first.min_salary() {
        return Some(BracketResolution::FallbackLowest(first));
    }

    let mut best_below = first;
    for bracket in brackets {
        if salary >= bracket.min_salary() && salary <= bracket.max_salary() {
            return Some(BracketResolution::Exact(bracket));
        }
        if salary >= bracket.min_salary() {
            best_below = bracket;
        }
    }

    Some(BracketResolution::FallbackHighest(best_below))
}

/// Checks that the active brackets tile `[0, domain_end]` with no gaps and
/// no overlaps, treating ranges as inclusive with centavo granularity.
pub fn validate_bracket_tiling<B: SalaryBand>(
    brackets: &[B],
    domain_end: &BigDecimal,
) -> Result<(), String> {
    let centavo: BigDecimal = "0.01".parse().expect("centavo literal");
    let mut expected_min = BigDecimal::from(0);

    if brackets.is_empty() {
        return Err("bracket table is empty".to_string());
    }

    for (idx, bracket) in brackets.iter().enumerate() {
        if bracket.min_salary() != &expected_min {
            return Err(format!(
                "bracket {} starts at {} but {} was expected",
                idx,
                bracket.min_salary(),
                expected_min
            ));
        }
        if bracket.max_salary() < bracket.min_salary() {
            return Err(format!("bracket {} has an inverted range", idx));
        }
        expected_min = bracket.max_salary() + &centavo;
    }

    let last = brackets.last().unwrap();
    if last.max_salary() < domain_end {
        return Err(format!(
            "bracket table ends at {} short of {}",
            last.max_salary(),
            domain_end
        ));
    }

    Ok(())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SssContribution {
    pub msc: BigDecimal,
    pub ee: BigDecimal,
    pub er: BigDecimal,
    pub ec: BigDecimal,
    /// Employer share plus the EC rider.
    pub employer_total: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhilhealthContribution {
    /// Salary after the floor/ceiling clamp.
    pub premium_base: BigDecimal,
    pub ee: BigDecimal,
    pub er: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagibigContribution {
    /// Contribution base after the fund-salary cap.
    pub fund_salary: BigDecimal,
    pub ee: BigDecimal,
    pub er: BigDecimal,
    pub total: BigDecimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionBreakdown {
    pub sss: SssContribution,
    pub philhealth: PhilhealthContribution,
    pub pagibig: PagibigContribution,
}

impl ContributionBreakdown {
    /// Sum of the employee shares, the amount deducted from gross pay.
    pub fn total_employee_share(&self) -> BigDecimal {
        &self.sss.ee + &self.philhealth.ee + &self.pagibig.ee
    }
}

pub fn compute_sss(brackets: &[SssBracket], salary: &BigDecimal) -> Result<SssContribution, AppError> {
    let resolution = resolve_bracket(brackets, salary)
        .ok_or_else(|| AppError::Configuration("No active SSS brackets seeded".to_string()))?;
    if resolution.is_fallback() {
        log::warn!("SSS bracket miss for salary {}, using fallback bracket", salary);
    }
    let bracket = resolution.bracket();

    let ee = round_centavos(&(&bracket.msc * &bracket.ee_rate));
    let er = round_centavos(&(&bracket.msc * &bracket.er_rate));
    let ec = bracket.ec_amount.clone();
    let employer_total = &er + &ec;
    let total = &ee + &employer_total;

    Ok(SssContribution {
        msc: bracket.msc.clone(),
        ee,
        er,
        ec,
        employer_total,
        total,
    })
}

pub fn compute_philhealth(config: &PhilhealthConfig, salary: &BigDecimal) -> PhilhealthContribution {
    let premium_base = salary
        .clone()
        .max(config.min_salary.clone())
        .min(config.max_salary.clone());
    let premium = round_centavos(&(&premium_base * &config.premium_rate));
    let hundred = BigDecimal::from(100);
    let ee = round_centavos(&(&premium * &config.ee_share_percent / &hundred));
    // Keep ee + er equal to the premium regardless of rounding.
    let er = &premium - &ee;

    PhilhealthContribution {
        premium_base,
        ee,
        er,
        total: premium,
    }
}

pub fn compute_pagibig(
    brackets: &[PagibigBracket],
    salary: &BigDecimal,
) -> Result<PagibigContribution, AppError> {
    let resolution = resolve_bracket(brackets, salary)
        .ok_or_else(|| AppError::Configuration("No active Pag-IBIG brackets seeded".to_string()))?;
    if resolution.is_fallback() {
        log::warn!(
            "Pag-IBIG bracket miss for salary {}, using fallback bracket",
            salary
        );
    }
    let bracket = resolution.bracket();

    // The cap applies to the contribution base, not the tier lookup.
    let fund_salary = salary.clone().min(bracket.max_fund_salary.clone());
    let ee = round_centavos(&(&fund_salary * &bracket.ee_rate));
    let er = round_centavos(&(&fund_salary * &bracket.er_rate));
    let total = &ee + &er;

    Ok(PagibigContribution {
        fund_salary,
        ee,
        er,
        total,
    })
}

/// Full monthly breakdown for a salary against one year's active tables.
pub fn calculate_contributions(
    tables: &StatutoryTables,
    salary: &BigDecimal,
) -> Result<ContributionBreakdown, AppError> {
    let philhealth_config = tables.philhealth.as_ref().ok_or_else(|| {
        AppError::Configuration(format!(
            "No active PhilHealth config for year {}",
            tables.year
        ))
    })?;

    Ok(ContributionBreakdown {
        sss: compute_sss(&tables.sss, salary)?,
        philhealth: compute_philhealth(philhealth_config, salary),
        pagibig: compute_pagibig(&tables.pagibig, salary)?,
    })
}

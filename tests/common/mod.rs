#![allow(dead_code)]

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use sweldo_be::database::models::{
    LatePolicy, PagibigBracket, PhilhealthConfig, ShiftTemplate, SssBracket, TaxBracket,
};
use sweldo_be::services::attendance::AttendancePolicy;
use sweldo_be::services::statutory::StatutoryTables;

pub fn dec(s: &str) -> BigDecimal {
    s.parse().expect("decimal literal")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
}

pub fn policy(grace: i32, late_policy: LatePolicy, overtime: bool) -> AttendancePolicy {
    AttendancePolicy {
        grace_period_minutes: grace,
        late_policy,
        is_overtime_allowed: overtime,
    }
}

pub fn shift(start: (u32, u32), end: (u32, u32)) -> ShiftTemplate {
    ShiftTemplate {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        name: "fixture shift".to_string(),
        start_time: time(start.0, start.1),
        end_time: time(end.0, end.1),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
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

/// The seeded 2025 SSS ladder: MSC 5,000 to 35,000 in 500-peso steps.
pub fn sss_ladder() -> Vec<SssBracket> {
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

pub fn philhealth_config() -> PhilhealthConfig {
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

pub fn pagibig_tiers() -> Vec<PagibigBracket> {
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

pub fn tax_table() -> Vec<TaxBracket> {
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

pub fn statutory_tables() -> StatutoryTables {
    StatutoryTables {
        year: 2025,
        sss: sss_ladder(),
        philhealth: Some(philhealth_config()),
        pagibig: pagibig_tiers(),
        tax: tax_table(),
        overtime_rates: HashMap::new(),
    }
}

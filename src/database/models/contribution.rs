use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// SSS salary-range bracket. Ranges are inclusive on both ends and must
/// tile [0, inf) for each effective year; the EC rider is a flat amount
/// that rides on the employer share.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SssBracket {
    pub id: Uuid,
    pub effective_year: i32,
    pub min_salary: BigDecimal,
    pub max_salary: BigDecimal,
    pub msc: BigDecimal,
    pub ee_rate: BigDecimal,
    pub er_rate: BigDecimal,
    pub ec_amount: BigDecimal,
    pub is_active: bool,
}

/// Single active PhilHealth premium config per year: a flat rate applied to
/// the salary clamped into [min_salary, max_salary], split by share percent.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PhilhealthConfig {
    pub id: Uuid,
    pub effective_year: i32,
    pub min_salary: BigDecimal,
    pub max_salary: BigDecimal,
    pub premium_rate: BigDecimal,
    pub ee_share_percent: BigDecimal,
    pub er_share_percent: BigDecimal,
    pub is_active: bool,
}

/// Pag-IBIG tier. The contribution base (not the raw salary) is capped at
/// `max_fund_salary` before the rates apply.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PagibigBracket {
    pub id: Uuid,
    pub effective_year: i32,
    pub min_salary: BigDecimal,
    pub max_salary: BigDecimal,
    pub ee_rate: BigDecimal,
    pub er_rate: BigDecimal,
    pub max_fund_salary: BigDecimal,
    pub is_active: bool,
}

/// Progressive withholding bracket:
/// tax(x) = base_tax + percentage% * max(0, x - excess_over).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    pub id: Uuid,
    pub effective_year: i32,
    pub min_salary: BigDecimal,
    pub max_salary: BigDecimal,
    pub base_tax: BigDecimal,
    pub percentage: BigDecimal,
    pub excess_over: BigDecimal,
    pub is_active: bool,
}

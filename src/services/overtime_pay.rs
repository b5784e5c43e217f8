use std::collections::HashMap;

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::database::models::macros::string_enum;

/// Organizational constants for deriving an hourly rate from a monthly
/// salary: 26 working days a month, 8 hours a day.
const WORKING_DAYS_PER_MONTH: u32 = 26;
const WORK_HOURS_PER_DAY: u32 = 8;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "snake_case")]
    pub enum OvertimeRateKey {
        RegularOt => "regular_ot",
        RestDayOt => "rest_day_ot",
        HolidayOt => "holiday_ot",
        HolidayRestDayOt => "holiday_rest_day_ot",
    }
}

impl OvertimeRateKey {
    /// Hard-coded fallbacks so an unseeded rate table still pays overtime.
    pub fn default_multiplier(self) -> BigDecimal {
        let s = match self {
            OvertimeRateKey::RegularOt => "1.25",
            OvertimeRateKey::RestDayOt => "1.69",
            OvertimeRateKey::HolidayOt => "2.60",
            OvertimeRateKey::HolidayRestDayOt => "3.38",
        };
        s.parse().expect("default multiplier literal")
    }
}

/// Key selection in priority order: holiday-and-rest-day beats holiday,
/// holiday beats rest day, rest day beats regular.
pub fn select_rate_key(is_rest_day: bool, is_holiday: bool) -> OvertimeRateKey {
    match (is_holiday, is_rest_day) {
        (true, true) => OvertimeRateKey::HolidayRestDayOt,
        (true, false) => OvertimeRateKey::HolidayOt,
        (false, true) => OvertimeRateKey::RestDayOt,
        (false, false) => OvertimeRateKey::RegularOt,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimePayable {
    pub rate_key: OvertimeRateKey,
    pub multiplier: BigDecimal,
    pub hourly_rate: BigDecimal,
    pub total: BigDecimal,
}

/// Hourly rate off the monthly basic salary; exact division, unrounded.
pub fn hourly_rate(basic_monthly_salary: &BigDecimal) -> BigDecimal {
    basic_monthly_salary
        / BigDecimal::from(WORKING_DAYS_PER_MONTH)
        / BigDecimal::from(WORK_HOURS_PER_DAY)
}

/// Payable amount for already-classified overtime hours. The caller decides
/// the holiday/rest-day flags; `active_rates` maps rate keys to configured
/// multipliers, with hard-coded defaults for missing keys.
pub fn calculate_payable(
    basic_monthly_salary: &BigDecimal,
    hours: &BigDecimal,
    is_rest_day: bool,
    is_holiday: bool,
    active_rates: &HashMap<String, BigDecimal>,
) -> OvertimePayable {
    let rate_key = select_rate_key(is_rest_day, is_holiday);
    let multiplier = active_rates
        .get(rate_key.as_str())
        .cloned()
        .unwrap_or_else(|| {
            log::warn!(
                "No active overtime rate for key {}, using default",
                rate_key
            );
            rate_key.default_multiplier()
        });

    let hourly = hourly_rate(basic_monthly_salary);
    let total = &hourly * &multiplier * hours;

    OvertimePayable {
        rate_key,
        multiplier,
        hourly_rate: hourly,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn key_selection_priority_order() {
        assert_eq!(select_rate_key(true, true), OvertimeRateKey::HolidayRestDayOt);
        assert_eq!(select_rate_key(false, true), OvertimeRateKey::HolidayOt);
        assert_eq!(select_rate_key(true, false), OvertimeRateKey::RestDayOt);
        assert_eq!(select_rate_key(false, false), OvertimeRateKey::RegularOt);
    }

    #[test]
    fn hourly_rate_uses_26_days_and_8_hours() {
        assert_eq!(hourly_rate(&dec("26000")), dec("125"));
    }

    #[test]
    fn regular_day_payable_matches_reference_scenario() {
        // 26,000 monthly, 2.5 hours on a regular day: 125 * 1.25 * 2.5.
        let rates = HashMap::new();
        let payable = calculate_payable(&dec("26000"), &dec("2.5"), false, false, &rates);
        assert_eq!(payable.rate_key, OvertimeRateKey::RegularOt);
        assert_eq!(payable.multiplier, dec("1.25"));
        assert_eq!(payable.hourly_rate, dec("125"));
        assert_eq!(payable.total, dec("390.625"));
    }

    #[test]
    fn configured_rate_overrides_default() {
        let mut rates = HashMap::new();
        rates.insert("rest_day_ot".to_string(), dec("1.50"));
        let payable = calculate_payable(&dec("26000"), &dec("2"), true, false, &rates);
        assert_eq!(payable.multiplier, dec("1.50"));
        assert_eq!(payable.total, dec("375.00"));
    }

    #[test]
    fn missing_key_falls_back_to_default_multiplier() {
        let rates = HashMap::new();
        let payable = calculate_payable(&dec("26000"), &dec("1"), true, true, &rates);
        assert_eq!(payable.rate_key, OvertimeRateKey::HolidayRestDayOt);
        assert_eq!(payable.multiplier, dec("3.38"));
        assert_eq!(payable.total, dec("422.50"));
    }
}

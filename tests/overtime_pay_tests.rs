mod common;

use std::collections::HashMap;

use pretty_assertions::assert_eq;

use common::dec;
use sweldo_be::services::overtime_pay::{
    calculate_payable, hourly_rate, select_rate_key, OvertimeRateKey,
};

#[test]
fn multiplier_key_priority_is_holiday_rest_then_holiday_then_rest() {
    assert_eq!(select_rate_key(true, true), OvertimeRateKey::HolidayRestDayOt);
    assert_eq!(select_rate_key(false, true), OvertimeRateKey::HolidayOt);
    assert_eq!(select_rate_key(true, false), OvertimeRateKey::RestDayOt);
    assert_eq!(select_rate_key(false, false), OvertimeRateKey::RegularOt);
}

#[test]
fn hourly_rate_divides_by_26_days_and_8_hours() {
    assert_eq!(hourly_rate(&dec("26000")), dec("125"));
    assert_eq!(hourly_rate(&dec("20800")), dec("100"));
}

#[test]
fn regular_day_reference_scenario() {
    // 2.5 approved hours on a regular day at a 26,000 monthly salary:
    // 125/hour at 1.25 gives 390.625.
    let payable = calculate_payable(&dec("26000"), &dec("2.5"), false, false, &HashMap::new());
    assert_eq!(payable.hourly_rate, dec("125"));
    assert_eq!(payable.multiplier, dec("1.25"));
    assert_eq!(payable.total, dec("390.625"));
}

#[test]
fn default_multipliers_cover_every_key() {
    let rates = HashMap::new();
    let cases = [
        (false, false, "1.25"),
        (true, false, "1.69"),
        (false, true, "2.60"),
        (true, true, "3.38"),
    ];
    for (rest, holiday, multiplier) in cases {
        let payable = calculate_payable(&dec("26000"), &dec("1"), rest, holiday, &rates);
        assert_eq!(payable.multiplier, dec(multiplier));
    }
}

#[test]
fn configured_rates_win_over_defaults() {
    let mut rates = HashMap::new();
    rates.insert("holiday_ot".to_string(), dec("2.00"));

    let payable = calculate_payable(&dec("26000"), &dec("4"), false, true, &rates);
    assert_eq!(payable.multiplier, dec("2.00"));
    assert_eq!(payable.total, dec("1000.00"));

    // Keys without a configured row still fall back.
    let fallback = calculate_payable(&dec("26000"), &dec("4"), true, true, &rates);
    assert_eq!(fallback.multiplier, dec("3.38"));
}

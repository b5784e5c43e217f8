mod common;

use pretty_assertions::assert_eq;

use common::{dec, pagibig_tiers, philhealth_config, sss_ladder, statutory_tables, tax_table};
use sweldo_be::services::contributions::{
    calculate_contributions, compute_pagibig, compute_philhealth, compute_sss,
    validate_bracket_tiling,
};
use sweldo_be::services::tax::compute_monthly_tax;

#[test]
fn seeded_tables_tile_the_salary_domain() {
    let domain_end = dec("9999999");
    validate_bracket_tiling(&sss_ladder(), &domain_end).expect("SSS ladder");
    validate_bracket_tiling(&pagibig_tiers(), &domain_end).expect("Pag-IBIG tiers");
    validate_bracket_tiling(&tax_table(), &domain_end).expect("tax table");
}

#[test]
fn sss_shares_follow_the_msc() {
    let ladder = sss_ladder();

    // 15,000 salary sits in the 15,000-MSC bracket: 5% EE, 10% ER, EC at
    // the stepped-up 30 since the MSC reached the boundary.
    let sss = compute_sss(&ladder, &dec("15000")).unwrap();
    assert_eq!(sss.ee, dec("750.00"));
    assert_eq!(sss.er, dec("1500.00"));
    assert_eq!(sss.ec, dec("30.00"));
    assert_eq!(sss.total, &sss.ee + &sss.er + &sss.ec);

    // Just below the bracket edge the MSC and the EC rider both drop.
    let sss = compute_sss(&ladder, &dec("14749.99")).unwrap();
    assert_eq!(sss.msc, dec("14500"));
    assert_eq!(sss.ec, dec("10.00"));
}

#[test]
fn sss_extremes_use_edge_brackets() {
    let ladder = sss_ladder();

    let floor = compute_sss(&ladder, &dec("0")).unwrap();
    assert_eq!(floor.msc, dec("5000"));

    let ceiling = compute_sss(&ladder, &dec("1000000")).unwrap();
    assert_eq!(ceiling.msc, dec("35000"));
}

#[test]
fn philhealth_split_is_half_and_half() {
    let config = philhealth_config();
    let contribution = compute_philhealth(&config, &dec("25000"));

    assert_eq!(contribution.total, dec("1250.00"));
    assert_eq!(contribution.ee, dec("625.00"));
    assert_eq!(contribution.er, dec("625.00"));
    assert_eq!(contribution.total, &contribution.ee + &contribution.er);
}

#[test]
fn pagibig_tiers_and_cap() {
    let tiers = pagibig_tiers();

    let below_threshold = compute_pagibig(&tiers, &dec("1499.99")).unwrap();
    assert_eq!(below_threshold.ee, dec("15.00"));

    let at_threshold = compute_pagibig(&tiers, &dec("1500")).unwrap();
    assert_eq!(at_threshold.ee, dec("30.00"));

    let capped = compute_pagibig(&tiers, &dec("80000")).unwrap();
    assert_eq!(capped.fund_salary, dec("10000"));
    assert_eq!(capped.ee, dec("200.00"));
    assert_eq!(capped.er, dec("200.00"));
}

#[test]
fn full_breakdown_for_a_26000_salary() {
    let tables = statutory_tables();
    let breakdown = calculate_contributions(&tables, &dec("26000")).unwrap();

    assert_eq!(breakdown.sss.msc, dec("26000"));
    assert_eq!(breakdown.sss.ee, dec("1300.00"));
    assert_eq!(breakdown.philhealth.ee, dec("650.00"));
    assert_eq!(breakdown.pagibig.ee, dec("200.00"));
    assert_eq!(breakdown.total_employee_share(), dec("2150.00"));
}

#[test]
fn tax_is_continuous_and_progressive() {
    let table = tax_table();

    assert_eq!(compute_monthly_tax(&table, &dec("20833")), dec("0.00"));

    // One centavo into the next bracket rounds back to zero.
    assert_eq!(compute_monthly_tax(&table, &dec("20833.01")), dec("0.00"));

    // The 26,000-salary scenario: taxable 23,850 after 2,150 in employee
    // shares; 15% of the excess over 20,833.
    assert_eq!(compute_monthly_tax(&table, &dec("23850")), dec("452.55"));

    // Boundary between the 20% and 25% brackets.
    assert_eq!(compute_monthly_tax(&table, &dec("66667")), dec("8541.80"));
    assert_eq!(compute_monthly_tax(&table, &dec("66667.01")), dec("8541.80"));
}

#[test]
fn tax_below_the_table_is_zero_and_above_uses_top_bracket() {
    let table = tax_table();
    assert_eq!(compute_monthly_tax(&table, &dec("0")), dec("0.00"));
    assert_eq!(
        compute_monthly_tax(&table, &dec("2000000")),
        dec("650208.35")
    );
}

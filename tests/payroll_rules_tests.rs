mod common;

use chrono::Utc;
use pretty_assertions::assert_eq;
use sqlx::types::Json;
use uuid::Uuid;

use common::{date, dec};
use sweldo_be::database::models::{
    Payslip, PayslipDetails, PayslipUpdateInput, PayrollStatus,
};
use sweldo_be::services::payroll::{
    apply_payslip_edit, days_in_period, period_factor, recompute_payslip_totals,
};

#[test]
fn cutoff_span_is_inclusive_of_both_ends() {
    assert_eq!(days_in_period(date(2025, 6, 1), date(2025, 6, 15)), 15);
    assert_eq!(days_in_period(date(2025, 6, 16), date(2025, 6, 30)), 15);
    assert_eq!(days_in_period(date(2025, 6, 1), date(2025, 6, 30)), 30);
}

#[test]
fn semimonthly_heuristic_pays_half_below_25_days() {
    assert_eq!(period_factor(date(2025, 6, 1), date(2025, 6, 15)), dec("0.5"));
    assert_eq!(period_factor(date(2025, 6, 1), date(2025, 6, 24)), dec("0.5"));
    assert_eq!(period_factor(date(2025, 6, 1), date(2025, 6, 25)), dec("1"));
    assert_eq!(period_factor(date(2025, 6, 1), date(2025, 6, 30)), dec("1"));
}

fn payslip() -> Payslip {
    let now = Utc::now();
    Payslip {
        id: Uuid::new_v4(),
        payroll_id: Uuid::new_v4(),
        employee_id: Uuid::new_v4(),
        reference_no: "PS-FIXTURE1".to_string(),
        basic_pay: dec("13000.00"),
        allowance: dec("500.00"),
        overtime_pay: dec("390.63"),
        gross_pay: dec("13890.63"),
        sss_ee: dec("1300.00"),
        philhealth_ee: dec("650.00"),
        pagibig_ee: dec("200.00"),
        withholding_tax: dec("0.00"),
        other_deductions: dec("0.00"),
        total_deductions: dec("2150.00"),
        net_pay: dec("11740.63"),
        details: Json(PayslipDetails::default()),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn recompute_keeps_the_identity_net_equals_gross_minus_deductions() {
    let mut slip = payslip();
    recompute_payslip_totals(&mut slip);

    assert_eq!(slip.gross_pay, dec("13890.63"));
    assert_eq!(slip.total_deductions, dec("2150.00"));
    assert_eq!(slip.net_pay, &slip.gross_pay - &slip.total_deductions);
}

#[test]
fn draft_edit_only_redoes_local_arithmetic() {
    let mut slip = payslip();
    let input = PayslipUpdateInput {
        basic_pay: None,
        allowance: Some(dec("1500.00")),
        overtime_pay: None,
        sss_ee: None,
        philhealth_ee: None,
        pagibig_ee: None,
        withholding_tax: Some(dec("250.00")),
        other_deductions: None,
    };

    apply_payslip_edit(&mut slip, &input);

    assert_eq!(slip.gross_pay, dec("14890.63"));
    assert_eq!(slip.total_deductions, dec("2400.00"));
    assert_eq!(slip.net_pay, dec("12490.63"));
}

#[test]
fn lifecycle_has_no_skipped_states() {
    use PayrollStatus::*;

    assert!(Draft.can_transition_to(Finalized));
    assert!(Finalized.can_transition_to(Paid));

    for (from, to) in [
        (Draft, Paid),
        (Finalized, Draft),
        (Paid, Finalized),
        (Paid, Draft),
    ] {
        assert!(!from.can_transition_to(to), "{:?} -> {:?} must be illegal", from, to);
    }

    assert!(!Draft.is_locked());
    assert!(Finalized.is_locked());
    assert!(Paid.is_locked());
}

mod common;

use chrono::Duration;
use pretty_assertions::assert_eq;

use common::{date, policy, shift, time};
use sweldo_be::database::models::{AttendanceStatus, LatePolicy};
use sweldo_be::services::attendance::{compute_late, compute_overtime, evaluate_attendance};
use sweldo_be::services::schedule::resolve_shift_window;

#[test]
fn grace_period_swallows_lateness_under_both_policies() {
    let day = date(2025, 6, 2);
    let start = day.and_time(time(8, 0));

    for late_policy in [LatePolicy::Exact, LatePolicy::Block30] {
        let p = policy(15, late_policy, false);
        for minutes in 0..=15 {
            let arrival = start + Duration::minutes(minutes);
            assert_eq!(
                compute_late(start, arrival, &p),
                0,
                "{} minutes within grace must not be late",
                minutes
            );
        }
    }
}

#[test]
fn block30_boundary_table() {
    let day = date(2025, 6, 2);
    let start = day.and_time(time(8, 0));
    let p = policy(0, LatePolicy::Block30, false);

    // The first block snaps up; beyond it the raw minutes pass through.
    let cases = [(6, 30), (29, 30), (30, 30), (31, 31), (45, 45)];
    for (raw, expected) in cases {
        let arrival = start + Duration::minutes(raw);
        assert_eq!(compute_late(start, arrival, &p), expected);
    }
}

#[test]
fn amnesty_window_waives_the_late_penalty() {
    let p = policy(10, LatePolicy::Exact, false);
    let s = shift((8, 0), (17, 0));

    // 150 raw minutes is far past grace yet reports zero late minutes.
    let eval = evaluate_attendance(
        date(2025, 6, 2),
        Some(time(10, 30)),
        Some(time(17, 0)),
        Some(&s),
        &p,
        false,
    );
    assert_eq!(eval.status, AttendanceStatus::HalfDay);
    assert_eq!(eval.late_minutes, 0);
}

#[test]
fn overnight_shift_window_never_goes_negative() {
    let s = shift((22, 0), (6, 0));
    let window = resolve_shift_window(date(2025, 6, 2), &s);
    assert!(window.end > window.start);

    let p = policy(0, LatePolicy::Exact, true);
    let eval = evaluate_attendance(
        date(2025, 6, 2),
        Some(time(23, 50)),
        Some(time(6, 10)),
        Some(&s),
        &p,
        false,
    );
    let worked = eval.time_out.unwrap() - eval.time_in.unwrap();
    assert!(worked.num_minutes() > 0);
    assert_eq!(eval.ot_minutes, 10);
}

#[test]
fn missing_punches_classify_before_any_time_math() {
    let p = policy(0, LatePolicy::Exact, true);
    let s = shift((8, 0), (17, 0));

    let eval = evaluate_attendance(date(2025, 6, 2), None, None, Some(&s), &p, false);
    assert_eq!(eval.status, AttendanceStatus::Absent);

    let eval = evaluate_attendance(date(2025, 6, 2), None, Some(time(17, 0)), Some(&s), &p, false);
    assert_eq!(eval.status, AttendanceStatus::Incomplete);
    assert_eq!(eval.ot_minutes, 0);
}

#[test]
fn reference_day_scenario() {
    // Shift 08:00-17:00, grace 10, exact policy, in 08:25, out 18:00,
    // overtime allowed: late is the full raw 25 minutes, OT is 60.
    let p = policy(10, LatePolicy::Exact, true);
    let s = shift((8, 0), (17, 0));
    let eval = evaluate_attendance(
        date(2025, 6, 2),
        Some(time(8, 25)),
        Some(time(18, 0)),
        Some(&s),
        &p,
        false,
    );
    assert_eq!(eval.status, AttendanceStatus::Late);
    assert_eq!(eval.late_minutes, 25);
    assert_eq!(eval.ot_minutes, 60);
}

#[test]
fn overtime_is_zero_when_disallowed_even_past_shift_end() {
    let day = date(2025, 6, 2);
    let end = day.and_time(time(17, 0));
    let p = policy(0, LatePolicy::Exact, false);
    assert_eq!(compute_overtime(end, end + Duration::hours(3), &p), 0);
}

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::database::models::{
    AttendanceLog, AttendanceLogInput, AttendanceStatus, Employment, LatePolicy, ShiftTemplate,
};
use crate::database::repositories::{
    AttendanceRepository, EmployeeRepository, LeaveRepository, PayrollRepository,
};
use crate::error::AppError;
use crate::services::schedule::resolve_shift_window;

/// Minutes-late band treated as a half-day absence instead of a late arrival.
/// More than two hours late but at most five.
const AMNESTY_MIN_MINUTES: i64 = 120;
const AMNESTY_MAX_MINUTES: i64 = 300;

/// The attendance-relevant slice of an employment assignment.
#[derive(Debug, Clone)]
pub struct AttendancePolicy {
    pub grace_period_minutes: i32,
    pub late_policy: LatePolicy,
    pub is_overtime_allowed: bool,
}

impl From<&Employment> for AttendancePolicy {
    fn from(employment: &Employment) -> Self {
        Self {
            grace_period_minutes: employment.grace_period_minutes,
            late_policy: employment.late_policy,
            is_overtime_allowed: employment.is_overtime_allowed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEvaluation {
    pub status: AttendanceStatus,
    pub late_minutes: i32,
    pub ot_minutes: i32,
    /// Punches composed onto the log date, with the cross-midnight
    /// correction already applied to the time-out.
    pub time_in: Option<NaiveDateTime>,
    pub time_out: Option<NaiveDateTime>,
}

/// Late minutes after grace and the late policy are applied.
///
/// Under `block30`, lateness within the first block snaps up to a flat 30
/// while anything beyond it reports the exact raw minutes. Grace is a
/// threshold, not a subtracted offset.
pub fn compute_late(
    scheduled_start: NaiveDateTime,
    actual_in: NaiveDateTime,
    policy: &AttendancePolicy,
) -> i64 {
    if actual_in <= scheduled_start {
        return 0;
    }
    let raw = (actual_in - scheduled_start).num_minutes();
    if raw <= policy.grace_period_minutes as i64 {
        return 0;
    }
    match policy.late_policy {
        LatePolicy::Exact => raw,
        LatePolicy::Block30 => {
            if raw <= 30 {
                30
            } else {
                raw
            }
        }
    }
}

/// Worked overtime minutes past the scheduled end. No cap and no minimum
/// threshold; the one-hour floor on overtime *requests* is a separate gate.
pub fn compute_overtime(
    scheduled_end: NaiveDateTime,
    actual_out: NaiveDateTime,
    policy: &AttendancePolicy,
) -> i64 {
    if !policy.is_overtime_allowed {
        return 0;
    }
    if actual_out <= scheduled_end {
        return 0;
    }
    (actual_out - scheduled_end).num_minutes()
}

/// Derives the day's attendance outcome from raw punches.
///
/// Sequencing is load-bearing: the cross-midnight correction runs before any
/// duration math, and the amnesty window is checked before the late>0 check.
pub fn evaluate_attendance(
    date: NaiveDate,
    time_in: Option<NaiveTime>,
    time_out: Option<NaiveTime>,
    shift: Option<&ShiftTemplate>,
    policy: &AttendancePolicy,
    is_rest_day: bool,
) -> AttendanceEvaluation {
    let (time_in, time_out) = match (time_in, time_out) {
        (None, None) => {
            let status = if is_rest_day {
                AttendanceStatus::RestDay
            } else {
                AttendanceStatus::Absent
            };
            return AttendanceEvaluation {
                status,
                late_minutes: 0,
                ot_minutes: 0,
                time_in: None,
                time_out: None,
            };
        }
        (Some(i), Some(o)) => {
            let in_dt = date.and_time(i);
            let mut out_dt = date.and_time(o);
            // Clock-out earlier than clock-in means the shift ran past midnight.
            if out_dt < in_dt {
                out_dt += Duration::days(1);
            }
            (in_dt, out_dt)
        }
        (only_in, only_out) => {
            return AttendanceEvaluation {
                status: AttendanceStatus::Incomplete,
                late_minutes: 0,
                ot_minutes: 0,
                time_in: only_in.map(|t| date.and_time(t)),
                time_out: only_out.map(|t| date.and_time(t)),
            };
        }
    };

    let window = shift.map(|s| resolve_shift_window(date, s));

    let raw_late = window
        .map(|w| (time_in - w.start).num_minutes().max(0))
        .unwrap_or(0);
    let late = window
        .map(|w| compute_late(w.start, time_in, policy))
        .unwrap_or(0);
    let ot = window
        .map(|w| compute_overtime(w.end, time_out, policy))
        .unwrap_or(0);

    let (status, late_minutes) = if raw_late > AMNESTY_MIN_MINUTES && raw_late <= AMNESTY_MAX_MINUTES
    {
        // Half-day absence assumed; the late penalty is waived.
        (AttendanceStatus::HalfDay, 0)
    } else if late > 0 {
        (AttendanceStatus::Late, late)
    } else {
        (AttendanceStatus::Present, 0)
    };

    AttendanceEvaluation {
        status,
        late_minutes: late_minutes as i32,
        ot_minutes: ot as i32,
        time_in: Some(time_in),
        time_out: Some(time_out),
    }
}

/// Attendance entry points: manual store, kiosk punch, bulk import, and the
/// compute-only preview. Every mutation path runs the same payroll-lock and
/// leave-overlap guard.
#[derive(Clone)]
pub struct AttendanceService {
    attendance_repository: AttendanceRepository,
    employee_repository: EmployeeRepository,
    payroll_repository: PayrollRepository,
    leave_repository: LeaveRepository,
}

impl AttendanceService {
    pub fn new(
        attendance_repository: AttendanceRepository,
        employee_repository: EmployeeRepository,
        payroll_repository: PayrollRepository,
        leave_repository: LeaveRepository,
    ) -> Self {
        Self {
            attendance_repository,
            employee_repository,
            payroll_repository,
            leave_repository,
        }
    }

    /// Rejects writes for dates covered by a finalized/paid payroll or an
    /// active leave. The payroll check is advisory at this boundary;
    /// finalization is the authoritative gate.
    async fn guard_mutation(
        &self,
        employee_id: Uuid,
        company_id: Uuid,
        date: NaiveDate,
    ) -> Result<(), AppError> {
        if self.payroll_repository.is_date_locked(company_id, date).await? {
            return Err(AppError::LockViolation(format!(
                "Attendance for {} is covered by a finalized payroll",
                date
            )));
        }
        if let Some(leave) = self
            .leave_repository
            .find_blocking_leave(employee_id, date)
            .await?
        {
            return Err(AppError::LockViolation(format!(
                "Attendance for {} overlaps a {} {} leave",
                date, leave.status, leave.leave_type
            )));
        }
        Ok(())
    }

    async fn evaluate_for_employment(
        &self,
        employment: &Employment,
        date: NaiveDate,
        time_in: Option<NaiveTime>,
        time_out: Option<NaiveTime>,
    ) -> Result<AttendanceEvaluation, AppError> {
        let shift = match employment.shift_template_id {
            Some(shift_id) => self.employee_repository.find_shift_template(shift_id).await?,
            None => None,
        };
        let policy = AttendancePolicy::from(employment);
        Ok(evaluate_attendance(
            date,
            time_in,
            time_out,
            shift.as_ref(),
            &policy,
            employment.is_rest_day(date),
        ))
    }

    async fn active_employment(&self, employee_id: Uuid) -> Result<Employment, AppError> {
        self.employee_repository
            .find_active_employment(employee_id)
            .await?
            .ok_or_else(|| {
                AppError::validation(format!("Employee {} has no active employment", employee_id))
            })
    }

    /// Compute-only entry point; no persistence.
    pub async fn compute(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
        time_in: Option<NaiveTime>,
        time_out: Option<NaiveTime>,
    ) -> Result<AttendanceEvaluation, AppError> {
        let employment = self.active_employment(employee_id).await?;
        self.evaluate_for_employment(&employment, date, time_in, time_out)
            .await
    }

    /// Manual store: creates the day's log or replaces its punches.
    pub async fn store(&self, input: AttendanceLogInput) -> Result<AttendanceLog, AppError> {
        let employment = self.active_employment(input.employee_id).await?;
        self.guard_mutation(input.employee_id, employment.company_id, input.log_date)
            .await?;

        let evaluation = self
            .evaluate_for_employment(&employment, input.log_date, input.time_in, input.time_out)
            .await?;

        match self
            .attendance_repository
            .find_by_employee_date(input.employee_id, input.log_date)
            .await?
        {
            Some(existing) => {
                self.attendance_repository
                    .update(existing.id, &evaluation, input.remarks.as_deref())
                    .await
                    .map_err(Into::into)
            }
            None => self
                .attendance_repository
                .insert(
                    input.employee_id,
                    employment.company_id,
                    input.log_date,
                    &evaluation,
                    input.remarks.as_deref(),
                )
                .await
                .map_err(Into::into),
        }
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: AttendanceLogInput,
    ) -> Result<AttendanceLog, AppError> {
        let existing = self
            .attendance_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Attendance log not found"))?;
        let employment = self.active_employment(existing.employee_id).await?;
        self.guard_mutation(existing.employee_id, existing.company_id, existing.log_date)
            .await?;

        let evaluation = self
            .evaluate_for_employment(&employment, existing.log_date, input.time_in, input.time_out)
            .await?;
        self.attendance_repository
            .update(id, &evaluation, input.remarks.as_deref())
            .await
            .map_err(Into::into)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let existing = self
            .attendance_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Attendance log not found"))?;
        self.guard_mutation(existing.employee_id, existing.company_id, existing.log_date)
            .await?;
        self.attendance_repository.delete(id).await.map_err(Into::into)
    }

    /// Kiosk punch: first punch of the day records the time-in, the second
    /// records the time-out and re-evaluates the day.
    pub async fn punch(&self, employee_id: Uuid, now: NaiveDateTime) -> Result<AttendanceLog, AppError> {
        let date = now.date();
        let employment = self.active_employment(employee_id).await?;
        self.guard_mutation(employee_id, employment.company_id, date).await?;

        let existing = self
            .attendance_repository
            .find_by_employee_date(employee_id, date)
            .await?;

        let (time_in, time_out) = match &existing {
            None => (Some(now.time()), None),
            Some(log) if log.time_out.is_none() => {
                (log.time_in.map(|t| t.time()), Some(now.time()))
            }
            Some(_) => {
                return Err(AppError::validation(
                    "Attendance for today already has both punches",
                ));
            }
        };

        let evaluation = self
            .evaluate_for_employment(&employment, date, time_in, time_out)
            .await?;

        match existing {
            Some(log) => self
                .attendance_repository
                .update(log.id, &evaluation, log.remarks.as_deref())
                .await
                .map_err(Into::into),
            None => self
                .attendance_repository
                .insert(employee_id, employment.company_id, date, &evaluation, None)
                .await
                .map_err(Into::into),
        }
    }

    /// Bulk import of pre-parsed rows. Fails fast with the offending row's
    /// position; rows already written stay written.
    pub async fn import(
        &self,
        rows: Vec<AttendanceLogInput>,
    ) -> Result<Vec<AttendanceLog>, AppError> {
        let mut saved = Vec::with_capacity(rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            let log = self.store(row).await.map_err(|err| match err {
                AppError::Validation(msg) => {
                    AppError::Validation(format!("Row {}: {}", idx + 1, msg))
                }
                AppError::LockViolation(msg) => {
                    AppError::LockViolation(format!("Row {}: {}", idx + 1, msg))
                }
                other => other,
            })?;
            saved.push(log);
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn policy(grace: i32, late_policy: LatePolicy, ot: bool) -> AttendancePolicy {
        AttendancePolicy {
            grace_period_minutes: grace,
            late_policy,
            is_overtime_allowed: ot,
        }
    }

    fn shift(start: (u32, u32), end: (u32, u32)) -> ShiftTemplate {
        ShiftTemplate {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "day".to_string(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn late_within_grace_is_zero_for_both_policies() {
        for lp in [LatePolicy::Exact, LatePolicy::Block30] {
            let p = policy(10, lp, false);
            assert_eq!(compute_late(at(8, 0), at(8, 10), &p), 0);
            assert_eq!(compute_late(at(8, 0), at(7, 55), &p), 0);
        }
    }

    #[test]
    fn exact_policy_reports_raw_minutes_past_grace() {
        // Grace is a threshold, not an offset: 25 raw minutes reports 25.
        let p = policy(10, LatePolicy::Exact, false);
        assert_eq!(compute_late(at(8, 0), at(8, 25), &p), 25);
    }

    #[test]
    fn block30_snaps_first_block_and_is_exact_beyond() {
        let p = policy(0, LatePolicy::Block30, false);
        assert_eq!(compute_late(at(8, 0), at(8, 6), &p), 30);
        assert_eq!(compute_late(at(8, 0), at(8, 30), &p), 30);
        assert_eq!(compute_late(at(8, 0), at(8, 31), &p), 31);
    }

    #[test]
    fn overtime_requires_policy_flag() {
        let allowed = policy(0, LatePolicy::Exact, true);
        let disallowed = policy(0, LatePolicy::Exact, false);
        assert_eq!(compute_overtime(at(17, 0), at(18, 30), &allowed), 90);
        assert_eq!(compute_overtime(at(17, 0), at(18, 30), &disallowed), 0);
        assert_eq!(compute_overtime(at(17, 0), at(16, 45), &allowed), 0);
    }

    #[test]
    fn no_punches_is_absent_or_rest_day() {
        let p = policy(0, LatePolicy::Exact, false);
        let s = shift((8, 0), (17, 0));

        let eval = evaluate_attendance(date(), None, None, Some(&s), &p, false);
        assert_eq!(eval.status, AttendanceStatus::Absent);

        let eval = evaluate_attendance(date(), None, None, Some(&s), &p, true);
        assert_eq!(eval.status, AttendanceStatus::RestDay);
    }

    #[test]
    fn single_punch_is_incomplete() {
        let p = policy(0, LatePolicy::Exact, false);
        let s = shift((8, 0), (17, 0));
        let eval = evaluate_attendance(
            date(),
            Some(NaiveTime::from_hms_opt(8, 0, 0).unwrap()),
            None,
            Some(&s),
            &p,
            false,
        );
        assert_eq!(eval.status, AttendanceStatus::Incomplete);
        assert_eq!(eval.late_minutes, 0);
        assert_eq!(eval.ot_minutes, 0);
    }

    #[test]
    fn amnesty_window_reports_half_day_with_no_late_minutes() {
        // 150 raw minutes late: well past grace, but inside (120, 300].
        let p = policy(10, LatePolicy::Exact, false);
        let s = shift((8, 0), (17, 0));
        let eval = evaluate_attendance(
            date(),
            Some(NaiveTime::from_hms_opt(10, 30, 0).unwrap()),
            Some(NaiveTime::from_hms_opt(17, 0, 0).unwrap()),
            Some(&s),
            &p,
            false,
        );
        assert_eq!(eval.status, AttendanceStatus::HalfDay);
        assert_eq!(eval.late_minutes, 0);
    }

    #[test]
    fn amnesty_boundaries_are_exclusive_then_inclusive() {
        let p = policy(0, LatePolicy::Exact, false);
        let s = shift((8, 0), (17, 0));
        let in_at = |h: u32, m: u32| Some(NaiveTime::from_hms_opt(h, m, 0).unwrap());
        let out = Some(NaiveTime::from_hms_opt(17, 0, 0).unwrap());

        // Exactly 120 minutes late stays Late, not HalfDay.
        let eval = evaluate_attendance(date(), in_at(10, 0), out, Some(&s), &p, false);
        assert_eq!(eval.status, AttendanceStatus::Late);
        assert_eq!(eval.late_minutes, 120);

        // Exactly 300 is still in the amnesty window.
        let eval = evaluate_attendance(date(), in_at(13, 0), out, Some(&s), &p, false);
        assert_eq!(eval.status, AttendanceStatus::HalfDay);

        // 301 is past it.
        let eval = evaluate_attendance(date(), in_at(13, 1), out, Some(&s), &p, false);
        assert_eq!(eval.status, AttendanceStatus::Late);
        assert_eq!(eval.late_minutes, 301);
    }

    #[test]
    fn scenario_exact_policy_25_minutes_late() {
        // basicRate 26000, shift 08:00-17:00, grace 10, exact policy,
        // time-in 08:25: raw 25 > grace 10, reported late is 25, not 15.
        let p = policy(10, LatePolicy::Exact, true);
        let s = shift((8, 0), (17, 0));
        let eval = evaluate_attendance(
            date(),
            Some(NaiveTime::from_hms_opt(8, 25, 0).unwrap()),
            Some(NaiveTime::from_hms_opt(17, 0, 0).unwrap()),
            Some(&s),
            &p,
            false,
        );
        assert_eq!(eval.status, AttendanceStatus::Late);
        assert_eq!(eval.late_minutes, 25);
    }

    #[test]
    fn overnight_shift_produces_positive_window() {
        let p = policy(0, LatePolicy::Exact, true);
        let s = shift((22, 0), (6, 0));
        let eval = evaluate_attendance(
            date(),
            Some(NaiveTime::from_hms_opt(23, 50, 0).unwrap()),
            Some(NaiveTime::from_hms_opt(6, 10, 0).unwrap()),
            Some(&s),
            &p,
            false,
        );

        let time_in = eval.time_in.unwrap();
        let time_out = eval.time_out.unwrap();
        assert!(time_out > time_in, "corrected time-out must follow time-in");
        assert_eq!(time_out.date(), date() + Duration::days(1));
        // 110 minutes late on a zero-grace policy, 10 minutes past shift end.
        assert_eq!(eval.status, AttendanceStatus::Late);
        assert_eq!(eval.late_minutes, 110);
        assert_eq!(eval.ot_minutes, 10);
    }

    #[test]
    fn no_shift_means_no_late_and_no_overtime() {
        let p = policy(0, LatePolicy::Exact, true);
        let eval = evaluate_attendance(
            date(),
            Some(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
            Some(NaiveTime::from_hms_opt(19, 0, 0).unwrap()),
            None,
            &p,
            false,
        );
        assert_eq!(eval.status, AttendanceStatus::Present);
        assert_eq!(eval.late_minutes, 0);
        assert_eq!(eval.ot_minutes, 0);
    }
}

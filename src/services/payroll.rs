use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use rand::distr::Alphanumeric;
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    DeductionKind, DeductionLine, Employment, Payroll, PayrollInput, PayrollStatus, Payslip,
    PayslipDetails, PayslipUpdateInput,
};
use crate::database::repositories::payroll::NewPayslip;
use crate::database::repositories::{
    AttendanceRepository, DeductionRepository, EmployeeRepository, OvertimeRepository,
    PayrollRepository,
};
use crate::database::transaction::DatabaseTransaction;
use crate::error::AppError;
use crate::services::contributions::calculate_contributions;
use crate::services::round_centavos;
use crate::services::statutory::{StatutoryService, StatutoryTables};
use crate::services::tax::compute_monthly_tax;

/// Cutoffs spanning at least this many days earn the full period factor;
/// shorter cutoffs are treated as a semimonthly half.
const FULL_PERIOD_MIN_DAYS: i64 = 25;

type GenerationKey = (Uuid, NaiveDate, NaiveDate);

/// Serializes payroll generation per (company, cutoff) pair so concurrent
/// submissions cannot race out duplicate payslip sets. The schema's unique
/// constraint on the same triple is the backstop.
#[derive(Clone, Default)]
struct GenerationLocks {
    inner: Arc<Mutex<HashSet<GenerationKey>>>,
}

struct GenerationGuard {
    key: GenerationKey,
    locks: Arc<Mutex<HashSet<GenerationKey>>>,
}

impl GenerationLocks {
    fn acquire(&self, key: GenerationKey) -> Result<GenerationGuard, AppError> {
        let mut held = self.inner.lock().expect("generation lock poisoned");
        if !held.insert(key) {
            return Err(AppError::LockViolation(
                "Payroll generation already in progress for this cutoff".to_string(),
            ));
        }
        Ok(GenerationGuard {
            key,
            locks: self.inner.clone(),
        })
    }
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.locks.lock() {
            held.remove(&self.key);
        }
    }
}

/// Number of calendar days a cutoff spans, inclusive.
pub fn days_in_period(cutoff_start: NaiveDate, cutoff_end: NaiveDate) -> i64 {
    (cutoff_end - cutoff_start).num_days() + 1
}

/// Semimonthly pro-ration heuristic: a cutoff of 25 days or more pays the
/// full monthly rate, anything shorter pays half. A coarse approximation
/// with no handling for mid-cutoff hires or resignations.
pub fn period_factor(cutoff_start: NaiveDate, cutoff_end: NaiveDate) -> BigDecimal {
    if days_in_period(cutoff_start, cutoff_end) >= FULL_PERIOD_MIN_DAYS {
        BigDecimal::from(1)
    } else {
        "0.5".parse().expect("period factor literal")
    }
}

/// Recomputes the derived payslip amounts from its component fields. Used
/// both at generation and for draft edits, which only redo this local
/// arithmetic.
pub fn recompute_payslip_totals(payslip: &mut Payslip) {
    payslip.gross_pay = &payslip.basic_pay + &payslip.allowance + &payslip.overtime_pay;
    payslip.total_deductions = &payslip.sss_ee
        + &payslip.philhealth_ee
        + &payslip.pagibig_ee
        + &payslip.withholding_tax
        + &payslip.other_deductions;
    payslip.net_pay = &payslip.gross_pay - &payslip.total_deductions;
}

/// Applies a draft edit onto the payslip and recomputes gross/net.
pub fn apply_payslip_edit(payslip: &mut Payslip, input: &PayslipUpdateInput) {
    if let Some(v) = &input.basic_pay {
        payslip.basic_pay = v.clone();
    }
    if let Some(v) = &input.allowance {
        payslip.allowance = v.clone();
    }
    if let Some(v) = &input.overtime_pay {
        payslip.overtime_pay = v.clone();
    }
    if let Some(v) = &input.sss_ee {
        payslip.sss_ee = v.clone();
    }
    if let Some(v) = &input.philhealth_ee {
        payslip.philhealth_ee = v.clone();
    }
    if let Some(v) = &input.pagibig_ee {
        payslip.pagibig_ee = v.clone();
    }
    if let Some(v) = &input.withholding_tax {
        payslip.withholding_tax = v.clone();
    }
    if let Some(v) = &input.other_deductions {
        payslip.other_deductions = v.clone();
    }
    recompute_payslip_totals(payslip);
}

fn reference_no() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("PS-{}", suffix.to_uppercase())
}

fn batch_failure(employee_id: Uuid, step: &'static str, err: impl ToString) -> AppError {
    AppError::BatchFailure {
        employee_id,
        step,
        message: err.to_string(),
    }
}

/// Orchestrates payroll generation and the Draft -> Finalized -> Paid
/// lifecycle.
#[derive(Clone)]
pub struct PayrollService {
    pool: PgPool,
    payroll_repository: PayrollRepository,
    employee_repository: EmployeeRepository,
    overtime_repository: OvertimeRepository,
    attendance_repository: AttendanceRepository,
    deduction_repository: DeductionRepository,
    statutory_service: StatutoryService,
    generation_locks: GenerationLocks,
}

impl PayrollService {
    pub fn new(
        pool: PgPool,
        payroll_repository: PayrollRepository,
        employee_repository: EmployeeRepository,
        overtime_repository: OvertimeRepository,
        attendance_repository: AttendanceRepository,
        deduction_repository: DeductionRepository,
        statutory_service: StatutoryService,
    ) -> Self {
        Self {
            pool,
            payroll_repository,
            employee_repository,
            overtime_repository,
            attendance_repository,
            deduction_repository,
            statutory_service,
            generation_locks: GenerationLocks::default(),
        }
    }

    /// Creates the Draft payroll and generates every payslip in a single
    /// transaction. Any per-employee failure aborts and rolls back the
    /// whole batch, surfacing which employee and step failed.
    pub async fn generate(&self, input: PayrollInput) -> Result<Payroll, AppError> {
        if input.cutoff_start > input.cutoff_end {
            return Err(AppError::validation(
                "Cutoff start must not be after cutoff end",
            ));
        }

        let _guard = self.generation_locks.acquire((
            input.company_id,
            input.cutoff_start,
            input.cutoff_end,
        ))?;

        if self
            .payroll_repository
            .find_by_cutoff(input.company_id, input.cutoff_start, input.cutoff_end)
            .await?
            .is_some()
        {
            return Err(AppError::validation(
                "A payroll for this cutoff already exists",
            ));
        }

        // One snapshot of the statutory tables for the whole batch.
        let tables = self
            .statutory_service
            .tables_for(input.cutoff_end.year())
            .await?;

        let roster = self
            .employee_repository
            .list_active_employments(input.company_id)
            .await?;
        if roster.is_empty() {
            log::warn!(
                "Generating payroll for company {} with an empty roster",
                input.company_id
            );
        }

        let mut tx = self.pool.begin().await.map_err(AppError::from)?;
        let payroll = self
            .payroll_repository
            .insert_payroll(&mut tx, &input)
            .await?;

        for employment in &roster {
            let payslip = self
                .build_payslip(employment, &payroll, &tables)
                .await?;
            self.payroll_repository
                .insert_payslip(&mut tx, payroll.id, &payslip)
                .await
                .map_err(|e| batch_failure(employment.employee_id, "persist", e))?;
        }

        tx.commit().await.map_err(AppError::from)?;
        log::info!(
            "Generated payroll {} with {} payslips for cutoff {}..{}",
            payroll.id,
            roster.len(),
            payroll.cutoff_start,
            payroll.cutoff_end
        );

        Ok(payroll)
    }

    async fn build_payslip(
        &self,
        employment: &Employment,
        payroll: &Payroll,
        tables: &StatutoryTables,
    ) -> Result<NewPayslip, AppError> {
        let employee_id = employment.employee_id;
        let factor = period_factor(payroll.cutoff_start, payroll.cutoff_end);

        let basic_pay = round_centavos(&(&employment.basic_rate * &factor));
        let allowance = round_centavos(&employment.allowance);

        let overtime_pay = self
            .overtime_repository
            .sum_approved_payable(employee_id, payroll.cutoff_start, payroll.cutoff_end)
            .await
            .map_err(|e| batch_failure(employee_id, "overtime", e))?;
        let overtime_pay = round_centavos(&overtime_pay);

        let gross_pay = &basic_pay + &allowance + &overtime_pay;

        // Government deductions run against the monthly basic rate, honoring
        // the per-type toggles.
        let contributions = calculate_contributions(tables, &employment.basic_rate)
            .map_err(|e| batch_failure(employee_id, "contributions", e))?;
        let zero = BigDecimal::from(0);

        let sss_ee = if employment.is_sss_deducted {
            contributions.sss.ee.clone()
        } else {
            zero.clone()
        };
        let philhealth_ee = if employment.is_philhealth_deducted {
            contributions.philhealth.ee.clone()
        } else {
            zero.clone()
        };
        let pagibig_ee = if employment.is_pagibig_deducted {
            contributions.pagibig.ee.clone()
        } else {
            zero.clone()
        };

        let withholding_tax = if employment.is_tax_deducted {
            let taxable = &gross_pay - (&sss_ee + &philhealth_ee + &pagibig_ee);
            compute_monthly_tax(&tables.tax, &taxable)
        } else {
            zero.clone()
        };

        let mut deduction_lines = vec![
            DeductionLine {
                kind: DeductionKind::Sss,
                label: "SSS".to_string(),
                amount: sss_ee.clone(),
                source_id: None,
                installment_no: None,
            },
            DeductionLine {
                kind: DeductionKind::Philhealth,
                label: "PhilHealth".to_string(),
                amount: philhealth_ee.clone(),
                source_id: None,
                installment_no: None,
            },
            DeductionLine {
                kind: DeductionKind::Pagibig,
                label: "Pag-IBIG".to_string(),
                amount: pagibig_ee.clone(),
                source_id: None,
                installment_no: None,
            },
            DeductionLine {
                kind: DeductionKind::Tax,
                label: "Withholding Tax".to_string(),
                amount: withholding_tax.clone(),
                source_id: None,
                installment_no: None,
            },
        ];

        let mut other_deductions = zero.clone();

        let ledgers = self
            .deduction_repository
            .active_ledgers_for(employee_id)
            .await
            .map_err(|e| batch_failure(employee_id, "deductions", e))?;
        for ledger in ledgers {
            if ledger.is_settled() {
                continue;
            }
            let amount = ledger
                .amount_per_period
                .clone()
                .min(ledger.remaining_balance.clone());
            if amount <= zero {
                continue;
            }
            other_deductions += &amount;
            deduction_lines.push(DeductionLine {
                kind: DeductionKind::Ledger,
                label: ledger.label.clone(),
                amount,
                source_id: Some(ledger.id),
                installment_no: Some(ledger.installments_paid + 1),
            });
        }

        let loans = self
            .deduction_repository
            .active_loans_for(employee_id)
            .await
            .map_err(|e| batch_failure(employee_id, "deductions", e))?;
        for loan in loans {
            // Amortization capped at whatever balance remains.
            let amount = loan
                .monthly_amortization
                .clone()
                .min(loan.remaining_balance.clone());
            if amount <= zero {
                continue;
            }
            other_deductions += &amount;
            deduction_lines.push(DeductionLine {
                kind: DeductionKind::Loan,
                label: format!("{} loan", loan.loan_type),
                amount,
                source_id: Some(loan.id),
                installment_no: None,
            });
        }

        let total_deductions =
            &sss_ee + &philhealth_ee + &pagibig_ee + &withholding_tax + &other_deductions;
        let net_pay = &gross_pay - &total_deductions;

        let days_worked = self
            .attendance_repository
            .count_worked_days(employee_id, payroll.cutoff_start, payroll.cutoff_end)
            .await
            .map_err(|e| batch_failure(employee_id, "attendance", e))?;

        Ok(NewPayslip {
            employee_id,
            reference_no: reference_no(),
            basic_pay,
            allowance,
            overtime_pay: overtime_pay.clone(),
            gross_pay,
            sss_ee,
            philhealth_ee,
            pagibig_ee,
            withholding_tax,
            other_deductions,
            total_deductions,
            net_pay,
            details: PayslipDetails {
                days_in_period: days_in_period(payroll.cutoff_start, payroll.cutoff_end),
                days_worked,
                period_factor: factor.to_string(),
                overtime_pay,
                deductions: deduction_lines,
            },
        })
    }

    /// Draft -> Finalized. Idempotent when already Finalized; any other
    /// non-Draft state is rejected. Runs row-locked so a concurrent
    /// transition cannot interleave.
    pub async fn finalize(&self, id: Uuid, actor: Uuid) -> Result<Payroll, AppError> {
        let repo = self.payroll_repository.clone();

        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                let payroll = repo
                    .find_by_id_for_update(tx, id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Payroll not found"))?;

                match payroll.status {
                    PayrollStatus::Finalized => Ok(payroll),
                    PayrollStatus::Draft => {
                        let updated = repo
                            .set_status(tx, id, PayrollStatus::Finalized, Some(actor))
                            .await?;
                        Ok(updated)
                    }
                    PayrollStatus::Paid => Err(AppError::validation(
                        "Only draft payrolls can be finalized",
                    )),
                }
            })
        })
        .await
    }

    /// Finalized -> Paid. Settles ledger installments and loan amortizations
    /// recorded on the payslips in the same transaction.
    pub async fn mark_paid(&self, id: Uuid) -> Result<Payroll, AppError> {
        let repo = self.payroll_repository.clone();
        let deduction_repo = self.deduction_repository.clone();

        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                let payroll = repo
                    .find_by_id_for_update(tx, id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Payroll not found"))?;

                if !payroll.status.can_transition_to(PayrollStatus::Paid) {
                    return Err(AppError::validation(
                        "Only finalized payrolls can be marked paid",
                    ));
                }

                let payslips = repo.payslips_for(id).await?;
                for payslip in &payslips {
                    for line in &payslip.details.0.deductions {
                        let Some(source_id) = line.source_id else {
                            continue;
                        };
                        match line.kind {
                            DeductionKind::Ledger => {
                                deduction_repo
                                    .settle_ledger_installment(tx, source_id, &line.amount)
                                    .await?;
                            }
                            DeductionKind::Loan => {
                                deduction_repo
                                    .settle_loan_amortization(tx, source_id, &line.amount)
                                    .await?;
                            }
                            _ => {}
                        }
                    }
                }

                let updated = repo.set_status(tx, id, PayrollStatus::Paid, None).await?;
                Ok(updated)
            })
        })
        .await
    }

    /// Drafts may be deleted (payslips cascade); locked payrolls may not.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let payroll = self
            .payroll_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Payroll not found"))?;

        if payroll.status != PayrollStatus::Draft {
            return Err(AppError::LockViolation(
                "Only draft payrolls can be deleted".to_string(),
            ));
        }

        self.payroll_repository.delete(id).await.map_err(Into::into)
    }

    /// Draft-only payslip edit; re-runs the local arithmetic, never the
    /// batch generation steps.
    pub async fn update_payslip(
        &self,
        payslip_id: Uuid,
        input: PayslipUpdateInput,
    ) -> Result<Payslip, AppError> {
        let mut payslip = self
            .payroll_repository
            .find_payslip(payslip_id)
            .await?
            .ok_or_else(|| AppError::not_found("Payslip not found"))?;

        let payroll = self
            .payroll_repository
            .find_by_id(payslip.payroll_id)
            .await?
            .ok_or_else(|| AppError::not_found("Parent payroll not found"))?;

        if payroll.status != PayrollStatus::Draft {
            return Err(AppError::LockViolation(
                "Payslips are editable only while the payroll is draft".to_string(),
            ));
        }

        apply_payslip_edit(&mut payslip, &input);
        self.payroll_repository
            .update_payslip(&payslip)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use sqlx::types::Json;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn semimonthly_cutoff_pays_half() {
        // 1st through 15th: 15 days.
        assert_eq!(period_factor(date(2025, 6, 1), date(2025, 6, 15)), dec("0.5"));
        // 24 days is still a half period.
        assert_eq!(period_factor(date(2025, 6, 1), date(2025, 6, 24)), dec("0.5"));
    }

    #[test]
    fn monthly_cutoff_pays_full() {
        // Exactly 25 days crosses the threshold.
        assert_eq!(period_factor(date(2025, 6, 1), date(2025, 6, 25)), dec("1"));
        assert_eq!(period_factor(date(2025, 6, 1), date(2025, 6, 30)), dec("1"));
    }

    fn sample_payslip() -> Payslip {
        let now = Utc::now();
        Payslip {
            id: Uuid::new_v4(),
            payroll_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            reference_no: "PS-TEST0001".to_string(),
            basic_pay: dec("13000.00"),
            allowance: dec("1000.00"),
            overtime_pay: dec("390.63"),
            gross_pay: dec("14390.63"),
            sss_ee: dec("650.00"),
            philhealth_ee: dec("650.00"),
            pagibig_ee: dec("200.00"),
            withholding_tax: dec("0.00"),
            other_deductions: dec("500.00"),
            total_deductions: dec("2000.00"),
            net_pay: dec("12390.63"),
            details: Json(PayslipDetails::default()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn draft_edit_recomputes_gross_and_net_locally() {
        let mut payslip = sample_payslip();
        let input = PayslipUpdateInput {
            basic_pay: Some(dec("14000.00")),
            allowance: None,
            overtime_pay: Some(dec("0.00")),
            sss_ee: None,
            philhealth_ee: None,
            pagibig_ee: None,
            withholding_tax: None,
            other_deductions: Some(dec("0.00")),
        };

        apply_payslip_edit(&mut payslip, &input);

        assert_eq!(payslip.gross_pay, dec("15000.00"));
        assert_eq!(payslip.total_deductions, dec("1500.00"));
        assert_eq!(payslip.net_pay, dec("13500.00"));
    }

    #[test]
    fn status_transitions_follow_the_lifecycle() {
        use PayrollStatus::*;
        assert!(Draft.can_transition_to(Finalized));
        assert!(Finalized.can_transition_to(Paid));
        assert!(!Draft.can_transition_to(Paid));
        assert!(!Finalized.can_transition_to(Draft));
        assert!(!Paid.can_transition_to(Draft));
        assert!(!Paid.can_transition_to(Finalized));
        assert!(Finalized.is_locked() && Paid.is_locked() && !Draft.is_locked());
    }

    #[test]
    fn generation_lock_rejects_concurrent_same_cutoff() {
        let locks = GenerationLocks::default();
        let key = (Uuid::new_v4(), date(2025, 6, 1), date(2025, 6, 15));

        let guard = locks.acquire(key).expect("first acquire");
        assert!(matches!(
            locks.acquire(key),
            Err(AppError::LockViolation(_))
        ));

        drop(guard);
        locks.acquire(key).expect("released after drop");
    }
}

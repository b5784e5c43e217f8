use bigdecimal::{BigDecimal, RoundingMode};

pub mod attendance;
pub mod auth;
pub mod contributions;
pub mod overtime_pay;
pub mod payroll;
pub mod schedule;
pub mod statutory;
pub mod tax;

pub use attendance::AttendanceService;
pub use auth::AuthService;
pub use payroll::PayrollService;
pub use statutory::StatutoryService;

/// Round a peso amount to two decimal places, half-up.
pub fn round_centavos(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}
